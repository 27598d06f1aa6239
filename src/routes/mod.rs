/// Router Module Index
///
/// Every route sits behind the request gate, which is applied as a layer over the
/// whole router in `create_router`. Page protection is a property of the path, not of
/// the module a route is registered in.

/// Routes with no policy of their own: health checks and the session echo.
pub mod public;
