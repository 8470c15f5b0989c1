//! Locale-sensitive number formatting for the HTML report.

/// Number formatting conventions of a locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    tag: String,
    grouping: Option<char>,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::english()
    }
}

impl NumberLocale {
    /// English conventions: `1,234` and `56%`
    #[must_use]
    pub fn english() -> Self {
        Self {
            tag: "en".to_string(),
            grouping: Some(','),
        }
    }

    /// Locale of the running process, from `LC_ALL`, `LC_NUMERIC` or `LANG`
    #[must_use]
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map_or_else(Self::english, |value| Self::from_tag(&value))
    }

    /// Locale from a POSIX or BCP 47 tag such as `de_DE.UTF-8` or `fr-CA`
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let base = tag.split(['.', '@']).next().unwrap_or_default();
        let mut parts = base.split(['_', '-']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts.next().unwrap_or_default().to_ascii_uppercase();

        let grouping = match (language.as_str(), region.as_str()) {
            ("" | "c" | "posix", _) => return Self::english(),
            ("de" | "it" | "fr", "CH") => Some('\''),
            ("de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" | "el" | "ro", _) => Some('.'),
            ("fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" | "uk" | "hu", _) => {
                Some('\u{a0}')
            }
            _ => Some(','),
        };

        Self {
            tag: if region.is_empty() {
                language
            } else {
                format!("{language}-{region}")
            },
            grouping,
        }
    }

    /// Normalised tag, e.g. `de-DE`
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Format an integer with the grouping separator
    #[must_use]
    pub fn format_integer(&self, value: u64) -> String {
        let digits = value.to_string();
        let Some(separator) = self.grouping else {
            return digits;
        };
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(separator);
            }
            out.push(digit);
        }
        out
    }

    /// Format a ratio as a whole, rounded-down percentage; `n/a` if absent
    #[must_use]
    pub fn format_percent(&self, ratio: Option<f64>) -> String {
        ratio.map_or_else(
            || "n/a".to_string(),
            |r| {
                let percent = (r * 100.0).floor() as u64;
                match self.tag.split('-').next() {
                    Some("fr" | "de" | "sv" | "fi" | "nb" | "no" | "cs" | "sk") => {
                        format!("{percent}\u{a0}%")
                    }
                    Some("tr") => format!("%{percent}"),
                    _ => format!("{percent}%"),
                }
            },
        )
    }
}
