use axum::Router;
use crate::app::AppContext;

/// Trait for composable route modules
///
/// Each module contributes a router that expects [`AppContext`] state; the
/// [`App`](crate::App) applies the state once all modules are merged.
///
/// # Example
///
/// ```ignore
/// struct StatusModule;
///
/// impl RouteModule for StatusModule {
///     fn routes(&self) -> Router<AppContext> {
///         Router::new().route("/status", get(status))
///     }
/// }
/// ```
pub trait RouteModule {
    /// Returns a router with all routes for this module
    fn routes(&self) -> Router<AppContext>;

    /// Optional: specify a path prefix for all routes in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Registers this module's routes into the application router
    fn register(self, router: Router<AppContext>) -> Router<AppContext>
    where
        Self: Sized,
    {
        let routes = self.routes();

        if let Some(prefix) = self.prefix() {
            router.nest(prefix, routes)
        } else {
            router.merge(routes)
        }
    }
}
