//! Rule sets compiled into the crate. Learned when no knowledge base
//! directory is configured, so an installed binary needs no source tree.

/// One embedded rule file.
#[derive(Debug, Clone, Copy)]
pub struct RuleFile {
    pub name: &'static str,
    pub source: &'static str,
}

const EN_US: &[RuleFile] = &[
    RuleFile {
        name: "greetings.aiml",
        source: include_str!("../aiml/en-us/greetings.aiml"),
    },
    RuleFile {
        name: "identity.aiml",
        source: include_str!("../aiml/en-us/identity.aiml"),
    },
    RuleFile {
        name: "memory.aiml",
        source: include_str!("../aiml/en-us/memory.aiml"),
    },
    RuleFile {
        name: "reductions.aiml",
        source: include_str!("../aiml/en-us/reductions.aiml"),
    },
];

const PT_PT: &[RuleFile] = &[
    RuleFile {
        name: "identidade.aiml",
        source: include_str!("../aiml/pt-pt/identidade.aiml"),
    },
    RuleFile {
        name: "saudacoes.aiml",
        source: include_str!("../aiml/pt-pt/saudacoes.aiml"),
    },
];

/// Languages shipped with rules.
pub const LANGUAGES: &[&str] = &["en-us", "pt-pt"];

/// Bundled rule files of `lang` in learning order.
pub fn rules(lang: &str) -> Option<&'static [RuleFile]> {
    match lang {
        "en-us" => Some(EN_US),
        "pt-pt" => Some(PT_PT),
        _ => None,
    }
}
