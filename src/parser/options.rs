use anyhow::Result;
use std::env;

/// Environment variable selecting the [`DeclarationPolicy`]
pub const DECLARATIONS_ENV: &str = "LPPARSE_DECLARATIONS";
/// Environment variable enabling unique label enforcement
pub const UNIQUE_LABELS_ENV: &str = "LPPARSE_UNIQUE_LABELS";

/// How variables come into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationPolicy {
    /// Registered on first appearance, through `var` or use in an expression
    #[default]
    Implicit,
    /// Must be declared with `var` before use
    Explicit,
}

/// Knobs of the parser
///
/// The defaults accept implicitly declared variables and repeated labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    pub declarations: DeclarationPolicy,
    /// Reject constraint labels that repeat an earlier constraint or objective label
    pub unique_labels: bool,
}

impl ParserOptions {
    pub fn with_declarations(mut self, declarations: DeclarationPolicy) -> Self {
        self.declarations = declarations;
        self
    }

    pub fn with_unique_labels(mut self, unique_labels: bool) -> Self {
        self.unique_labels = unique_labels;
        self
    }

    /// Read options from `LPPARSE_DECLARATIONS` and `LPPARSE_UNIQUE_LABELS`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ParserOptions::from_env`] with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();

        if let Some(policy) = lookup(DECLARATIONS_ENV) {
            options.declarations = match policy.to_lowercase().as_str() {
                "implicit" => DeclarationPolicy::Implicit,
                "explicit" | "strict" => DeclarationPolicy::Explicit,
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid declaration policy '{}' in {}. Valid options: implicit, explicit",
                        policy,
                        DECLARATIONS_ENV
                    ));
                }
            };
        }

        if let Some(flag) = lookup(UNIQUE_LABELS_ENV) {
            options.unique_labels = match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid value '{}' in {}. Valid options: true, false",
                        flag,
                        UNIQUE_LABELS_ENV
                    ));
                }
            };
        }

        Ok(options)
    }
}
