//! Canonical column names used after the rename stage

pub const ID: &str = "id";
pub const GENERATION: &str = "generation";
pub const HEIGHT_METERS: &str = "height_meters";
pub const WEIGHT_KILOGRAMS: &str = "weight_kilograms";
pub const TYPE_1: &str = "type_1";
pub const EGG_STEPS: &str = "egg_steps";

/// The six combat stats summed into `base_stats`
pub const COMBAT_STATS: [&str; 6] = ["hp", "attack", "defense", "sp_attack", "sp_defense", "speed"];

// Derived metric columns
pub const BMI: &str = "bmi";
pub const BMI_RANK: &str = "bmi_rank";
pub const EGG_HATCH_TIME: &str = "egg_hatch_time";
pub const BASE_STATS: &str = "base_stats";
pub const TYPE_COUNT: &str = "type_count";

/// Source names that cannot be derived mechanically
pub static RENAMES: &[(&str, &str)] = &[
    ("Type 1", "type_1"),
    ("Type 2", "type_2"),
    ("Sp. Attack", "sp_attack"),
    ("Sp. Defense", "sp_defense"),
    ("GEN", "generation"),
];

/// Map a source column name to its canonical snake_case identifier
pub fn canonical_name(source: &str) -> String {
    if let Some((_, to)) = RENAMES.iter().find(|(from, _)| *from == source) {
        return to.to_string();
    }
    to_snake_case(source)
}

/// Lowercase, collapsing runs of non-alphanumerics into a single underscore
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut pending_sep = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !result.is_empty() {
                result.push('_');
            }
            pending_sep = false;
            result.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    result
}
