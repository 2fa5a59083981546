//! Rider name resolution.
//!
//! Results sites and draft sheets rarely agree on accents or punctuation
//! ("Pogacar" vs "Pogačar", "O'Connor" vs "OConnor"). Lookups try the exact
//! name first and fall back to a normalized key.

use std::collections::HashMap;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::Rider;

/// Lowercase, strip accents and punctuation, collapse whitespace.
///
/// Accents are removed by canonical decomposition, dropping the combining
/// marks. Letters with no decomposition go through [`fold_letter`].
pub fn normalize_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        if let Some(replacement) = fold_letter(c) {
            folded.push_str(replacement);
        } else if c.is_alphanumeric() {
            folded.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            folded.push(' ');
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII spelling of Latin letters that NFD leaves intact.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'þ' | 'Þ' => "th",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}

/// Outcome of resolving a name against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Exact(&'a str),
    Normalized(&'a str),
    /// Several riders share the normalized key
    Ambiguous,
    NotFound,
}

/// Two-phase name index over the rider universe, built once per operation.
#[derive(Debug)]
pub struct RiderIndex<'a> {
    exact: HashMap<&'a str, usize>,
    normalized: HashMap<String, Vec<usize>>,
    names: Vec<&'a str>,
}

impl<'a> RiderIndex<'a> {
    pub fn new(riders: &'a [Rider]) -> Self {
        let mut exact = HashMap::with_capacity(riders.len());
        let mut normalized: HashMap<String, Vec<usize>> = HashMap::with_capacity(riders.len());
        let mut names = Vec::with_capacity(riders.len());

        for (i, rider) in riders.iter().enumerate() {
            exact.entry(rider.name.as_str()).or_insert(i);
            normalized.entry(normalize_name(&rider.name)).or_default().push(i);
            names.push(rider.name.as_str());
        }

        Self {
            exact,
            normalized,
            names,
        }
    }

    pub fn resolve(&self, name: &str) -> Resolution<'a> {
        if let Some(&i) = self.exact.get(name) {
            return Resolution::Exact(self.names[i]);
        }

        match self.normalized.get(&normalize_name(name)).map(Vec::as_slice) {
            Some([i]) => Resolution::Normalized(self.names[*i]),
            Some([]) | None => Resolution::NotFound,
            Some(_) => Resolution::Ambiguous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_strips_accents() {
        assert_eq!(normalize_name("Tadej Pogačar"), "tadej pogacar");
        assert_eq!(normalize_name("Søren Kragh Andersen"), "soren kragh andersen");
        assert_eq!(normalize_name("Romain Grégoire"), "romain gregoire");
    }

    #[test]
    fn test_normalize_name_baltic_and_nordic_letters() {
        assert_eq!(normalize_name("Toms Skujiņš"), "toms skujins");
        assert_eq!(normalize_name("Krists Neilands"), "krists neilands");
        assert_eq!(normalize_name("Aivaras Mikutis"), "aivaras mikutis");
        assert_eq!(normalize_name("Gedvydas Žukauskas"), "gedvydas zukauskas");
        assert_eq!(normalize_name("Ķīļa Ģirts Ŗūta"), "kila girts ruta");
        assert_eq!(normalize_name("Ingvar Ómarsson"), "ingvar omarsson");
        assert_eq!(normalize_name("Þór Guðmundsson"), "thor gudmundsson");
        assert_eq!(normalize_name("Michał Kwiatkowski"), "michal kwiatkowski");
        assert_eq!(normalize_name("Ĝĥĵŝŭ ĩũ įų"), "ghjsu iu iu");
    }

    #[test]
    fn test_resolve_latvian_name_without_accents() {
        let riders = vec![
            Rider::new("Toms Skujiņš", "Lidl-Trek"),
            Rider::new("Ramūnas Navardauskas", "Lithuania"),
        ];
        let index = RiderIndex::new(&riders);

        assert_eq!(
            index.resolve("Toms Skujins"),
            Resolution::Normalized("Toms Skujiņš")
        );
        assert_eq!(
            index.resolve("ramunas navardauskas"),
            Resolution::Normalized("Ramūnas Navardauskas")
        );
    }

    #[test]
    fn test_normalize_name_strips_punctuation_and_whitespace() {
        assert_eq!(normalize_name("  Ben  O'Connor "), "ben oconnor");
        assert_eq!(normalize_name("VAN AERT Wout."), "van aert wout");
        assert_eq!(normalize_name("Mathieu\tvan der Poel"), "mathieu van der poel");
    }

    #[test]
    fn test_normalize_name_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name(" .,; "), "");
    }

    #[test]
    fn test_resolve_prefers_exact_match() {
        let riders = vec![Rider::new("Tadej Pogačar", "UAE")];
        let index = RiderIndex::new(&riders);

        assert_eq!(
            index.resolve("Tadej Pogačar"),
            Resolution::Exact("Tadej Pogačar")
        );
        assert_eq!(
            index.resolve("tadej pogacar"),
            Resolution::Normalized("Tadej Pogačar")
        );
        assert_eq!(index.resolve("Jonas Vingegaard"), Resolution::NotFound);
    }

    #[test]
    fn test_resolve_ambiguous_normalized_key() {
        let riders = vec![Rider::new("José Díaz", "A"), Rider::new("Jose Diaz", "B")];
        let index = RiderIndex::new(&riders);

        assert_eq!(index.resolve("Jose Diaz"), Resolution::Exact("Jose Diaz"));
        assert_eq!(index.resolve("JOSE DIAZ"), Resolution::Ambiguous);
        assert_eq!(index.resolve("jose  díaz"), Resolution::Ambiguous);
    }
}
