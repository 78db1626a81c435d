use serde::{Deserialize, Serialize};

/// ffmpeg arguments produced by a coder for one output stream
///
/// `global` flags go once per invocation ahead of every stream, `local`
/// flags belong to this stream only. Order is positional and must be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMapping {
    pub global: Vec<String>,
    pub local: Vec<String>,
}

impl CommandMapping {
    pub fn new(global: Vec<String>, local: Vec<String>) -> Self {
        Self { global, local }
    }

    /// Iterate `local` as flag/value pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.local
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Value following `flag` in `local`, if present
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.pairs().find(|(f, _)| *f == flag).map(|(_, v)| v)
    }

    pub fn contains_flag(&self, flag: &str) -> bool {
        self.pairs().any(|(f, _)| f == flag)
    }
}

/// Build the argument list for one invocation: all globals, then all locals
pub fn assemble_arguments(mappings: &[CommandMapping]) -> Vec<String> {
    let globals = mappings.iter().flat_map(|m| m.global.iter());
    let locals = mappings.iter().flat_map(|m| m.local.iter());

    globals.chain(locals).cloned().collect()
}
