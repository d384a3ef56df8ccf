use std::path::{Path, PathBuf};

/// Nesting bound used when none is configured.
pub const DEFAULT_MAX_NESTING: usize = 500;

/// Everything the front end needs to know about one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileContext {
    /// Source files of the compilation unit. Only the first one is read.
    pub source_files: Vec<PathBuf>,
    /// Name of the output artifact. Carried for later stages, unused here.
    pub output_name: String,
    /// Deepest block nesting the parser accepts.
    pub max_nesting: usize,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self {
            source_files: Vec::new(),
            output_name: "out".to_string(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl CompileContext {
    pub fn new(source_files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            source_files: source_files.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    /// The file the tokenizer opens.
    pub fn primary_source(&self) -> Option<&Path> {
        self.source_files.first().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let context = CompileContext::default();
        assert!(context.source_files.is_empty());
        assert_eq!(context.output_name, "out");
        assert_eq!(context.max_nesting, 500);
        assert_eq!(context.primary_source(), None);
    }

    #[test]
    fn builder_keeps_file_order() {
        let context = CompileContext::new(["main.nst", "lib.nst"])
            .with_max_nesting(8)
            .with_output_name("prog");
        assert_eq!(context.primary_source(), Some(Path::new("main.nst")));
        assert_eq!(context.source_files.len(), 2);
        assert_eq!(context.max_nesting, 8);
        assert_eq!(context.output_name, "prog");
    }
}
