//! Request-scoped phrase lookup.
//!
//! A [`Catalog`] is loaded once per process; each request negotiates a [`LocaleContext`] from it
//! and only ever reads through that handle.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::errors::DbError;

const BUILTIN: &str = include_str!("messages.toml");

type Phrases = HashMap<String, String>;

/// Phrases for every supported language.
#[derive(Debug, Clone)]
pub struct Catalog {
    default_lang: String,
    langs: HashMap<String, Arc<Phrases>>,
}

impl Catalog {
    /// The catalog shipped with the crate (`en`, `es`).
    ///
    /// # Errors
    /// Only if the embedded TOML is broken.
    pub fn builtin() -> Result<Self, DbError> {
        Self::from_toml_str(BUILTIN, "en")
    }

    /// Parses `[lang]` tables of `key = "phrase"`.
    ///
    /// # Errors
    /// Returns `Toml` on malformed input and `Config` when `default_lang` has no table.
    pub fn from_toml_str(s: &str, default_lang: &str) -> Result<Self, DbError> {
        let raw: HashMap<String, Phrases> = toml::from_str(s)?;
        let langs = raw.into_iter().map(|(k, v)| (normalize(&k), Arc::new(v))).collect();
        let cat = Self { default_lang: normalize(default_lang), langs };
        if !cat.supports(&cat.default_lang) {
            return Err(DbError::Config(format!("default locale '{default_lang}' has no phrases")));
        }
        Ok(cat)
    }

    /// Built-in phrases, overlaid with `locale_file` when configured.
    ///
    /// # Errors
    /// Returns an error when the extra file is unreadable or invalid, or the default locale is unknown.
    pub fn load(cfg: &QueryConfig) -> Result<Self, DbError> {
        let mut cat = Self::builtin()?;
        if let Some(path) = &cfg.locale_file {
            cat.merge_file(path)?;
        }
        cat.set_default(&cfg.default_locale)?;
        Ok(cat)
    }

    /// Adds or overrides phrases from a TOML file.
    ///
    /// # Errors
    /// Returns an error when the file is unreadable or invalid.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), DbError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        let raw: HashMap<String, Phrases> = toml::from_str(&s)?;
        for (lang, phrases) in raw {
            let entry = self.langs.entry(normalize(&lang)).or_default();
            Arc::make_mut(entry).extend(phrases);
        }
        log::info!("merged locale phrases from {}", path.display());
        Ok(())
    }

    /// # Errors
    /// Returns `Config` when `lang` has no phrases.
    pub fn set_default(&mut self, lang: &str) -> Result<(), DbError> {
        let lang = normalize(lang);
        if !self.supports(&lang) {
            return Err(DbError::Config(format!("default locale '{lang}' has no phrases")));
        }
        self.default_lang = lang;
        Ok(())
    }

    #[must_use]
    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    #[must_use]
    pub fn supports(&self, lang: &str) -> bool {
        self.langs.contains_key(lang)
    }

    /// Supported languages, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.langs.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    /// A handle bound to `lang`, or to the default when `lang` is unsupported.
    #[must_use]
    pub fn context(&self, lang: &str) -> LocaleContext {
        let lang = normalize(lang);
        let lang = if self.supports(&lang) { lang } else { self.default_lang.clone() };
        let phrases = self.langs.get(&lang).cloned().unwrap_or_default();
        LocaleContext { lang, phrases }
    }
}

/// Read-only phrase lookup for one request.
#[derive(Debug, Clone)]
pub struct LocaleContext {
    lang: String,
    phrases: Arc<Phrases>,
}

impl LocaleContext {
    /// Picks the request language: the detected language if supported, else the best supported
    /// `Accept-Language` entry, else the catalog default.
    #[must_use]
    pub fn negotiate(catalog: &Catalog, detected: Option<&str>, accept_language: Option<&str>) -> Self {
        if let Some(lang) = detected.map(primary_subtag).filter(|l| catalog.supports(l)) {
            return catalog.context(&lang);
        }
        let chosen = accept_language
            .map(parse_accept_language)
            .unwrap_or_default()
            .into_iter()
            .map(|(lang, _)| lang)
            .find(|l| catalog.supports(l));
        match chosen {
            Some(lang) => catalog.context(&lang),
            None => catalog.context(catalog.default_lang()),
        }
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Translates `key`; unknown keys come back unchanged.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Translates `key` and fills `%{name}` placeholders from `vars`.
    #[must_use]
    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        match self.phrases.get(key) {
            Some(phrase) => interpolate(phrase, vars),
            None => {
                log::warn!("missing phrase '{key}' for locale {}", self.lang);
                key.to_string()
            }
        }
    }
}

/// Replaces `%{name}` with the matching var. Unknown placeholders are left in place.
fn interpolate(phrase: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(phrase.len());
    let mut rest = phrase;
    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match vars.iter().find(|(k, _)| *k == name) {
            Some((_, v)) => out.push_str(v),
            None => out.push_str(&rest[start..start + 3 + end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// `es-MX,en;q=0.8,*;q=0.1` -> [("es",1.0),("en",0.8)], highest q first, ties in header order.
fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut out: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut it = part.split(';');
            let tag = it.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let q = it
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|v| v.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (q > 0.0).then(|| (primary_subtag(tag), q))
        })
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    out
}

fn primary_subtag(tag: &str) -> String {
    normalize(tag.split(['-', '_']).next().unwrap_or(tag))
}

fn normalize(lang: &str) -> String {
    lang.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_both_languages() {
        let c = Catalog::builtin().unwrap();
        assert_eq!(c.languages(), vec!["en", "es"]);
        assert_eq!(c.context("es").t("noReviewsFound"), "No se encontraron reseñas");
    }

    #[test]
    fn interpolation_fills_known_vars_only() {
        assert_eq!(interpolate("a %{x} b %{y}", &[("x", "1")]), "a 1 b %{y}");
        assert_eq!(interpolate("open %{x", &[("x", "1")]), "open %{x");
        assert_eq!(interpolate("%{x}%{x}", &[("x", "z")]), "zz");
    }

    #[test]
    fn accept_language_orders_by_quality() {
        let v = parse_accept_language("en;q=0.5, es-MX, fr;q=0, *;q=0.1");
        assert_eq!(v, vec![("es".to_string(), 1.0), ("en".to_string(), 0.5)]);
    }

    #[test]
    fn unknown_context_language_uses_default() {
        let c = Catalog::builtin().unwrap();
        assert_eq!(c.context("de").lang(), "en");
    }
}
