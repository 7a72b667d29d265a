use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// English messages, embedded so the binary does not depend on its working directory
const EN_MAIN: &str = include_str!("../locales/en/main.ftl");

/// Localization manager for user-facing bot messages
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    /// Create a new localization manager
    pub fn new() -> Result<Self> {
        let en_locale: LanguageIdentifier = "en".parse()?;
        let bundle = Self::create_bundle(en_locale, EN_MAIN)?;

        Ok(Self { bundle })
    }

    /// Create a fluent bundle for a specific locale from FTL source
    fn create_bundle(locale: LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Slack renders the Unicode isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("invalid Fluent resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("failed to add Fluent resource: {errors:?}"))?;

        Ok(bundle)
    }

    /// Get a localized message
    ///
    /// Unknown keys render as `Missing translation: <key>`. Formatting problems
    /// such as a missing argument are logged and the partial text is returned.
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        let Some(pattern) = self.bundle.get_message(key).and_then(|msg| msg.value()) else {
            return format!("Missing translation: {key}");
        };

        let fluent_args = args.map(|args| {
            args.iter()
                .map(|(name, value)| (*name, FluentValue::from(*value)))
                .collect::<FluentArgs>()
        });

        let mut errors = vec![];
        let value = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);

        if !errors.is_empty() {
            debug!(key, ?errors, "Fluent reported errors while formatting");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message(key, Some(&args_map))
    }
}
