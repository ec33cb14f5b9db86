use thiserror::Error;

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
/// This enum covers all failure conditions that can occur while constructing SSA form for a
/// method. The analysis operates on an already-flattened control flow graph produced by an
/// upstream collaborator, so the taxonomy is small: either the input graph is malformed, or
/// the fixed-point iteration failed to converge (which indicates a map-merge bug rather than
/// bad input).
///
/// Internal invariant violations (a map holder queried in the wrong state, liveness data
/// requested without the liveness pass enabled) are programming errors and panic instead of
/// returning an error value; silently recovering from them would corrupt the produced SSA
/// form and everything downstream of it.
///
/// # Examples
///
/// ```rust,no_run
/// use ssaflow::{Error, SsaConstructor, SsaOptions};
/// # let graph = ssaflow::DirectGraph::new();
/// # let mut graph = graph;
/// # let method = ssaflow::MethodDescriptor::new(false, &[]);
///
/// match SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method) {
///     Ok(form) => {
///         println!("{} phi entries", form.phi().len());
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed graph: {} ({}:{})", message, file, line);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input graph is damaged and could not be analyzed.
    ///
    /// This error indicates that the control flow graph handed over by the upstream
    /// flattening step is inconsistent, for example an edge or path wrapper referencing
    /// a node id that does not exist. The error includes the source location where the
    /// malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The fixed-point iteration exceeded its visit budget without stabilizing.
    ///
    /// Version sets grow monotonically within one analysis pass, so the iteration is
    /// guaranteed to terminate on well-formed input. Hitting the bound means a map-merge
    /// operation oscillates, and the pass aborts instead of looping silently.
    #[error("Fixed-point iteration did not converge after {visits} node visits (limit {limit})")]
    FixpointDiverged {
        /// Number of node visits performed before giving up
        visits: usize,
        /// The visit budget that was exceeded
        limit: usize,
    },
}
