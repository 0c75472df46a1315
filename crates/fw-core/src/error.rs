use std::path::PathBuf;

/// Alias for `Result<T, ContentError>`.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised while loading or validating story content.
///
/// All of these are fatal at load time: a story that fails validation is
/// never handed to the engine.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content is not valid JSON or does not match the schema.
    #[error("malformed content: {0}")]
    Parse(#[from] serde_json::Error),

    /// The content file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Two definitions of the same kind share an id.
    #[error("duplicate {kind} id \"{id}\"")]
    DuplicateId {
        /// The kind of definition (scene, item, stat, ...).
        kind: &'static str,
        /// The duplicated id.
        id: String,
    },

    /// A choice targets a scene or ending that does not exist.
    #[error("choice \"{choice}\" in scene \"{scene}\" targets unknown scene or ending \"{target}\"{}", did_you_mean(.suggestion))]
    UnknownTarget {
        /// The scene owning the choice.
        scene: String,
        /// The offending choice.
        choice: String,
        /// The unresolved target id.
        target: String,
        /// The closest known id, if any is close enough.
        suggestion: Option<String>,
    },

    /// A choice names an ending that does not exist.
    #[error("choice \"{choice}\" in scene \"{scene}\" names unknown ending \"{ending}\"")]
    UnknownEnding {
        /// The scene owning the choice.
        scene: String,
        /// The offending choice.
        choice: String,
        /// The unresolved ending id.
        ending: String,
    },

    /// The story's start scene does not exist.
    #[error("start scene \"{0}\" does not exist")]
    UnknownStart(String),

    /// A condition or effect references a catalog entry that does not exist.
    #[error("{owner} references unknown {kind} \"{id}\"")]
    UnknownReference {
        /// Where the reference was found (e.g. `scene "intro"`).
        owner: String,
        /// The catalog the reference points into.
        kind: &'static str,
        /// The unresolved id.
        id: String,
    },

    /// A stat definition whose bounds or initial value are inconsistent.
    #[error("stat \"{id}\" needs min <= initial <= max (got {min} <= {initial} <= {max})")]
    InvalidStatRange {
        /// The stat id.
        id: String,
        /// Declared minimum.
        min: i32,
        /// Declared initial value.
        initial: i32,
        /// Declared maximum.
        max: i32,
    },

    /// A progress achievement with a target of zero.
    #[error("progress achievement \"{0}\" needs a target greater than zero")]
    ZeroTarget(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean \"{s}\"?)"),
        None => String::new(),
    }
}

/// Reasons an inventory operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// Adding a new stack would exceed the inventory capacity.
    #[error("inventory is full ({capacity} stacks)")]
    Full {
        /// The configured number of stacks.
        capacity: usize,
    },

    /// The item is already held and does not stack.
    #[error("\"{0}\" does not stack")]
    NotStackable(String),

    /// The item id is not in the item catalog.
    #[error("unknown item \"{0}\"")]
    UnknownItem(String),

    /// A quantity of zero was requested.
    #[error("quantity must be greater than zero")]
    ZeroQuantity,
}
