// src/constants.rs

// --- Time Constants ---
pub const DAY_SECONDS: i64 = 86400;

// --- Rating Defaults ---
pub const DEFAULT_RATING: i64 = 1000;
pub const ELO_SCALE: f64 = 400.0;

// Session batch: K-factor bands (upper bound exclusive, K)
pub const K_FACTOR_HIGH: f64 = 32.0; // below 2000
pub const K_FACTOR_MID: f64 = 24.0; // 2000..2400
pub const K_FACTOR_LOW: f64 = 16.0; // 2400 and above
pub const K_BAND_MID_FLOOR: i64 = 2000;
pub const K_BAND_LOW_FLOOR: i64 = 2400;

// Question rating = BASE + (difficulty - 1) * STEP
pub const QUESTION_RATING_BASE: f64 = 1000.0;
pub const QUESTION_RATING_STEP: f64 = 250.0;

// Indexed by difficulty - 1
pub const DIFFICULTY_MULTIPLIERS: [f64; 5] = [1.0, 1.25, 1.5, 1.75, 2.0];

// --- Per Attempt Parameters ---
pub const ATTEMPT_GAIN_CORRECT: f64 = 100.0;
pub const ATTEMPT_LOSS_INCORRECT: f64 = 50.0;
pub const ATTEMPT_MAX_CHANGE: i64 = 20;

// (rating floor, factor), checked from the top down
pub const ATTEMPT_ELO_FACTOR_BANDS: [(i64, f64); 5] = [
    (0, 1.0),
    (1200, 0.75),
    (1500, 0.5),
    (1800, 0.25),
    (2100, 0.1),
];

// --- Spaced Repetition (SM-2) Parameters ---
pub const EASE_FACTOR_DEFAULT: f64 = 2.5;
pub const EASE_FACTOR_MIN: f64 = 1.3;

pub const INTERVAL_FIRST: u32 = 1; // Days
pub const INTERVAL_SECOND: u32 = 6; // Days
pub const INTERVAL_FAIL: u32 = 1; // Days
pub const INTERVAL_MAX: u32 = 365; // Days

pub const PASSING_QUALITY: u8 = 3;
pub const MAX_QUALITY: u8 = 5;

// --- Tiers ---
pub const TOP_TIER_PROGRESS_WINDOW: i64 = 500;

// (name, min, max, description); the last tier is unbounded
pub const DEFAULT_TIERS: [(&str, i64, Option<i64>, &str); 6] = [
    ("Novice", 0, Some(799), "Just getting started"),
    ("Apprentice", 800, Some(1199), "Comfortable with the basics"),
    ("Adept", 1200, Some(1599), "Solid working knowledge"),
    ("Expert", 1600, Some(1999), "Handles hard questions reliably"),
    ("Master", 2000, Some(2399), "Rarely misses"),
    ("Grandmaster", 2400, None, "Top of the ladder"),
];
