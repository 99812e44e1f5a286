//! Parse and projection settings.

/// Options controlling how source text is parsed and resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat `<<` keys as merge imports.
    pub merge: bool,
    /// Implicit keys spanning more bytes than this get a warning.
    pub max_key_length: usize,
    /// Upper bound on parser token operations.
    pub exec_fuel: Option<u32>,
    /// Upper bound on collection nesting.
    pub recursion_fuel: Option<u32>,
}

pub const DEFAULT_MAX_KEY_LENGTH: usize = 1024;
pub const DEFAULT_EXEC_FUEL: u32 = 1_000_000;
pub const DEFAULT_RECURSION_FUEL: u32 = 4096;
pub const DEFAULT_MAX_ALIAS_COUNT: u32 = 1000;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            merge: false,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            exec_fuel: Some(DEFAULT_EXEC_FUEL),
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_max_key_length(mut self, limit: usize) -> Self {
        self.max_key_length = limit;
        self
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel = limit;
        self
    }
}

/// Options for projecting a document into plain values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToValueOptions {
    /// Produce `Value::Map` with arbitrary keys instead of string-keyed objects.
    pub map_as_map: bool,
    /// Upper bound on alias dereferences per projection.
    pub max_alias_count: Option<u32>,
}

impl Default for ToValueOptions {
    fn default() -> Self {
        Self {
            map_as_map: false,
            max_alias_count: Some(DEFAULT_MAX_ALIAS_COUNT),
        }
    }
}

impl ToValueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map_as_map(mut self, value: bool) -> Self {
        self.map_as_map = value;
        self
    }

    pub fn with_max_alias_count(mut self, limit: Option<u32>) -> Self {
        self.max_alias_count = limit;
        self
    }
}

/// Layout settings for canonical text rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl TextOptions {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }
}
