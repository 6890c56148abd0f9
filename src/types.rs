/// Shared types used across the codebase

/// Operations a resource route can perform against its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Show,
    Create,
    Replace,
    Patch,
    Delete,
    Clear, // Empty the bucket but keep it
}

impl Operation {
    /// Read operations never save the document
    pub fn is_read(self) -> bool {
        matches!(self, Operation::List | Operation::Show)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Show => "show",
            Operation::Create => "create",
            Operation::Replace => "replace",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
            Operation::Clear => "clear",
        };
        f.write_str(name)
    }
}
