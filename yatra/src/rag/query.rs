//! Keyword heuristics that pick a reply language, guide persona and
//! location hints from a raw user query.

use crate::models::Language;

const ROMANIZED_HINDI: &[&str] = &[
    "namaste", "dhanyavad", "kripya", "kaise", "kahan", "kya", "hai", "hain", "mandir", "darshan",
];

const LOCATIONS: &[&str] = &[
    "delhi",
    "mumbai",
    "bangalore",
    "kolkata",
    "chennai",
    "hyderabad",
    "kerala",
    "goa",
    "rajasthan",
    "uttarakhand",
    "himachal",
    "kashmir",
    "ladakh",
    "sikkim",
    "assam",
    "meghalaya",
    "tamil nadu",
    "karnataka",
    "maharashtra",
    "gujarat",
    "punjab",
    "haryana",
    "uttar pradesh",
    "varanasi",
    "rishikesh",
    "manali",
    "leh",
    "amritsar",
    "jaipur",
    "udaipur",
];

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TrekInfo,
    SpiritualInfo,
    TravelPlanning,
    Safety,
    CrowdInfo,
    Wellness,
    Food,
    EcoTourism,
    Accommodation,
    Festival,
    General,
}

impl Intent {
    /// Intents checked against a query, in priority order.
    const KEYWORDS: [(Intent, &'static [&'static str]); 10] = [
        (Intent::TrekInfo, &["trek", "hiking", "mountain", "climb", "altitude"]),
        (
            Intent::SpiritualInfo,
            &["temple", "mandir", "pilgrimage", "darshan", "aarti", "shloka", "prayer"],
        ),
        (
            Intent::TravelPlanning,
            &["plan", "itinerary", "trip", "visit", "tour", "travel"],
        ),
        (
            Intent::Safety,
            &["safe", "safety", "emergency", "danger", "risk", "first aid"],
        ),
        (
            Intent::CrowdInfo,
            &["crowd", "busy", "wait time", "queue", "avoid crowds"],
        ),
        (
            Intent::Wellness,
            &["yoga", "meditation", "wellness", "relax", "stress", "pranayama"],
        ),
        (Intent::Food, &["food", "cuisine", "eat", "restaurant", "dish", "meal"]),
        (
            Intent::EcoTourism,
            &["eco", "sustainable", "green", "environment", "carbon"],
        ),
        (
            Intent::Accommodation,
            &["stay", "hotel", "homestay", "accommodation", "lodge"],
        ),
        (Intent::Festival, &["festival", "celebration", "event", "mela"]),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrekInfo => "trek_info",
            Self::SpiritualInfo => "spiritual_info",
            Self::TravelPlanning => "travel_planning",
            Self::Safety => "safety",
            Self::CrowdInfo => "crowd_info",
            Self::Wellness => "wellness",
            Self::Food => "food",
            Self::EcoTourism => "eco_tourism",
            Self::Accommodation => "accommodation",
            Self::Festival => "festival",
            Self::General => "general",
        }
    }

    /// Guide persona best suited to this intent.
    pub fn persona_id(&self) -> &'static str {
        match self {
            Self::TrekInfo => "pers003",
            Self::SpiritualInfo | Self::Wellness => "pers002",
            Self::Safety => "pers005",
            Self::Festival => "pers004",
            _ => "pers001",
        }
    }
}

/// Devanagari anywhere, or at least two romanized Hindi words, means Hindi.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        return Language::Hi;
    }

    let lower = text.to_lowercase();
    let hits = ROMANIZED_HINDI
        .iter()
        .filter(|word| lower.contains(*word))
        .count();

    if hits >= 2 {
        Language::Hi
    } else {
        Language::En
    }
}

/// Every intent whose keywords appear in the query, or `[General]`.
pub fn extract_intents(query: &str) -> Vec<Intent> {
    let lower = query.to_lowercase();
    let intents: Vec<Intent> = Intent::KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .collect();

    if intents.is_empty() {
        vec![Intent::General]
    } else {
        intents
    }
}

pub fn select_persona(query: &str) -> &'static str {
    extract_intents(query)
        .first()
        .map(Intent::persona_id)
        .unwrap_or("pers001")
}

pub fn extract_location(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    LOCATIONS.iter().copied().find(|loc| lower.contains(loc))
}

pub fn extract_month(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    MONTHS.iter().copied().find(|month| lower.contains(month))
}
