use thiserror::Error;

use crate::metadata::{
    tables::TableId,
    token::{Token, TypeHandle},
};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure in this crate reflects malformed or mismatched input data rather than a
/// transient condition, so errors are always propagated to the caller and never retried.
///
/// # Error Categories
///
/// ## Table Decoding Errors
/// - [`Error::Malformed`] - A record or heap violates the binary table format
/// - [`Error::OutOfBounds`] - A read would have run past the end of a table
///
/// ## Resolution Errors
/// - [`Error::TypeResolution`] - A deferred type reference could not be resolved
/// - [`Error::IndexOutOfRange`] - A module-relative index addresses a missing record
/// - [`Error::ModuleNotFound`] - A module index is not known to the registry
/// - [`Error::AmbiguousCrossModuleReference`] - A parent chain leaves every loaded module
/// - [`Error::RecursionLimit`] - A parent chain is deeper than the configured bound
///
/// ## Marshalling Errors
/// - [`Error::InvalidLayout`] - A struct has no usable native layout
/// - [`Error::MissingStub`] - A record needs a stub the generator did not emit
/// - [`Error::Allocation`] - The allocator could not construct a wrapper instance
/// - [`Error::Stub`] - A generated stub reported a failure
///
/// # Examples
///
/// ```rust
/// use projscope::{Error, InteropRegistry};
///
/// let registry = InteropRegistry::builder().build()?;
/// match registry.dispatch_table(0, 0) {
///     Err(Error::ModuleNotFound(module)) => println!("no module {module}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// # Ok::<(), projscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a table.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A deferred type reference could not be located by the [`crate::TypeResolver`].
    ///
    /// Fatal to the operation that depended on the reference.
    #[error("Failed to resolve type reference - {0}")]
    TypeResolution(Token),

    /// A module-relative index does not address a record of its table.
    ///
    /// Indicates a corrupt or mismatched metadata table; never expected in correct operation.
    #[error("Index {index} is out of range for table {table:?} with {len} records")]
    IndexOutOfRange {
        /// The table that was addressed
        table: TableId,
        /// The requested zero-based index
        index: usize,
        /// The number of records in that table
        len: usize,
    },

    /// The registry has no module at the given position.
    #[error("No interop module at index {0}")]
    ModuleNotFound(usize),

    /// The struct has no valid native layout and cannot be marshalled.
    ///
    /// Only the struct described by this record is affected.
    #[error("Struct record {index} of module {module} has an invalid native layout")]
    InvalidLayout {
        /// The module that owns the struct record
        module: usize,
        /// The index of the struct record
        index: u32,
    },

    /// A cross-module parent reference names a type that no loaded module describes.
    ///
    /// Only raised when [`crate::RegistryConfig::strict_cross_module`] is set; otherwise the chain
    /// simply ends at that point.
    #[error("Parent {0} is not described by any loaded module")]
    AmbiguousCrossModuleReference(TypeHandle),

    /// Recursion limit reached.
    ///
    /// Parent chains are bounded by [`crate::RegistryConfig::max_chain_depth`] to protect against
    /// cyclic metadata. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A record requires a stub that the generator did not provide.
    #[error("Record {index} of table {table:?} has no stub for this operation")]
    MissingStub {
        /// The table of the record
        table: TableId,
        /// The index of the record
        index: u32,
    },

    /// The external allocator could not construct an instance.
    #[error("Failed to allocate wrapper instance - {0}")]
    Allocation(String),

    /// A generated stub reported a failure.
    #[error("Stub failed - {0}")]
    Stub(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
