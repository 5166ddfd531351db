use rand::Rng;

/// Icon names accepted in `CatFactSpec::icon_name`, in display order.
pub const ICON_NAMES: [&str; 9] = [
    "Grinning", "Smiling", "Joy", "Hearts", "Evil", "Kissing", "Weary",
    "Crying", "Pouting",
];

/// Read-only view over [`ICON_NAMES`].
#[derive(Clone, Copy, Debug, Default)]
pub struct IconCatalog;

impl IconCatalog {
    pub fn names(&self) -> &'static [&'static str] {
        &ICON_NAMES
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        ICON_NAMES.contains(&name)
    }

    /// Uniform pick over all catalog entries.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        ICON_NAMES[rng.random_range(0..ICON_NAMES.len())]
    }
}
