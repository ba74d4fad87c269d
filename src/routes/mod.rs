/// Router Module Index
///
/// Organizes the application's routing into security-segregated modules so
/// access control is applied once, at the module level, via Axum layers.
/// An individual handler cannot forget to invoke the gate.
///
/// The three modules map directly to the access tiers.

/// Routes accessible to anonymous clients: signup, login, post reads.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware: session
/// introspection and post mutation.
pub mod authenticated;

/// Routes restricted to the 'admin' role: user management. The role check is
/// enforced by middleware wrapped around the whole module.
pub mod admin;
