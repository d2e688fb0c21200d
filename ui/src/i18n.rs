//! Internationalization (i18n) support for `tapir-ui`.
//!
//! `fl!` resolves the bundle from the package name with `-` replaced by `_`,
//! so the files are called `tapir_ui.ftl`.
//!
//! - `i18n-embed` selects the language and loads assets
//! - `fluent` formats messages
//! - `rust-embed` embeds the `.ftl` files at compile time
//! - `i18n-embed-fl` checks `t!` keys against the fallback bundle
//!
//! ```text
//! i18n.toml
//! i18n/
//!   en-US/tapir_ui.ftl   (fallback/reference)
//!   de-DE/tapir_ui.ftl
//!   pt-PT/tapir_ui.ftl
//! ```
//!
//! The browser's `navigator.languages` decides the initial locale on the web;
//! native builds ask the OS.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl; // Re-export for convenience.

/// Looks a message up in the shared loader.
///
/// ```ignore
/// t!("nav-graph");
/// t!("export-build-for", dataset = name);
/// ```
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fallback file path is `i18n/en-US/{DOMAIN}.ftl`.
const DOMAIN: &str = "tapir_ui";

/// Embed all locale folders under `i18n/`.
#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

/// Global language loader used with the `fl!` macro.
pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = "en-US".parse().expect("valid fallback language identifier");
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

/// Initialize i18n (idempotent).
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            tracing::warn!(error = %err, "language selection failed; using fallback");
        }
    });
}

/// Switch language at runtime. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let lang: LanguageIdentifier = match tag.parse() {
        Ok(l) => l,
        Err(_) => return Ok(()),
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// List available (embedded) language identifiers.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::fl;

    #[test]
    fn fallback_language_is_present() {
        assert!(available_languages().iter().any(|l| l == "en-US"));
    }

    #[test]
    fn every_locale_ships_a_bundle_named_after_the_domain() {
        for lang in available_languages() {
            let path = format!("{lang}/{DOMAIN}.ftl");
            assert!(Localizations::get(&path).is_some(), "missing {path}");
        }
        assert_eq!(DOMAIN, env!("CARGO_PKG_NAME").replace('-', "_"));
    }

    #[test]
    fn basic_lookup_works() {
        init();
        set_language("en-US").unwrap();
        let s = fl!(&*LOADER, "nav-graph");
        assert_eq!(s, "Graph");
    }

    #[test]
    fn arguments_are_interpolated() {
        init();
        let s = fl!(&*LOADER, "export-build-for", dataset = "Active members");
        assert!(s.contains("Active members"));
    }

    #[test]
    fn dynamic_language_switch_reverts_on_failure() {
        init();
        let before = fl!(&*LOADER, "nav-graph");
        let _ = set_language("zz-ZZ");
        let after = fl!(&*LOADER, "nav-graph");
        assert_eq!(before, after);
    }
}
