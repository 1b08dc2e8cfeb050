// Presentation layer - HTTP handlers, page rendering and DTOs
pub mod app_state;
pub mod chart_svg;
pub mod error;
pub mod handlers;
pub mod html;
pub mod json_mapper;
