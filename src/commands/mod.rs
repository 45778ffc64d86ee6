pub mod logs;
pub mod navigation;
pub mod notifications;
pub mod update;
pub mod web;
