use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Whether the host filesystem hands back file names in decomposed form.
const DECOMPOSING_PLATFORM: bool = cfg!(target_os = "macos");

/// Recomposes file names into Unicode NFC on platforms whose filesystem
/// returns them decomposed; passes them through untouched elsewhere.
///
/// Implemented for single names and for ordered sequences of names, the output
/// has the same shape as the input.
pub trait NormalizeName {
    type Output;

    fn normalize_name(self) -> Self::Output;
}

pub(crate) fn normalize_for(name: String, decomposing: bool) -> String {
    if !decomposing || is_nfc(&name) {
        return name;
    }
    name.nfc().collect()
}

impl NormalizeName for String {
    type Output = String;

    fn normalize_name(self) -> String {
        normalize_for(self, DECOMPOSING_PLATFORM)
    }
}

impl NormalizeName for &str {
    type Output = String;

    fn normalize_name(self) -> String {
        self.to_owned().normalize_name()
    }
}

impl NormalizeName for Vec<String> {
    type Output = Vec<String>;

    fn normalize_name(self) -> Vec<String> {
        self.into_iter().map(NormalizeName::normalize_name).collect()
    }
}
