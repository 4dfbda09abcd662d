//! Page captions in the supported languages.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Portuguese,
}

impl Language {
    /// Accepts `en`, `pt`, and tags/POSIX values starting with them (`pt-BR`, `pt_BR.UTF-8`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let lang = raw
            .trim()
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" | "english" => Some(Self::English),
            "pt" | "portuguese" | "portugues" | "português" => Some(Self::Portuguese),
            _ => None,
        }
    }

    #[must_use]
    pub const fn labels(self) -> Labels {
        match self {
            Self::English => Labels {
                title: "Adder",
                first_placeholder: "First number",
                second_placeholder: "Second number",
                sum_button: "Sum",
                result_prefix: "Result:",
                loading: "Loading module",
                ready: "Module ready",
                failed: "Module failed",
            },
            Self::Portuguese => Labels {
                title: "Somador",
                first_placeholder: "Primeiro número",
                second_placeholder: "Segundo número",
                sum_button: "Somar",
                result_prefix: "Resultado:",
                loading: "Carregando módulo",
                ready: "Módulo pronto",
                failed: "Falha no módulo",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub title: &'static str,
    pub first_placeholder: &'static str,
    pub second_placeholder: &'static str,
    pub sum_button: &'static str,
    pub result_prefix: &'static str,
    pub loading: &'static str,
    pub ready: &'static str,
    pub failed: &'static str,
}

impl Default for Labels {
    fn default() -> Self {
        Language::default().labels()
    }
}
