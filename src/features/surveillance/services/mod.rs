mod category_order_service;
mod surveillance_service;

pub use category_order_service::CategoryOrderService;
pub use surveillance_service::SurveillanceService;
