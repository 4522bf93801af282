use budget_repo::tag_repo::NewTag;
use rand::seq::SliceRandom;

pub const PALETTE: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#008080", "#9a6324", "#800000",
];

/// A colour picked uniformly from [`PALETTE`].
pub fn random_color() -> String {
    PALETTE
        .choose(&mut rand::thread_rng())
        .unwrap_or(&PALETTE[0])
        .to_string()
}

/// A tag with the given name and a random colour.
pub fn new_tag(name: impl Into<String>) -> NewTag {
    NewTag::new(name.into(), random_color())
}
