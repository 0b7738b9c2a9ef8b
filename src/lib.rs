pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod flex_id;
pub mod handlers;
pub mod identity;
pub mod m3u;
pub mod navigator;
pub mod pairing;
pub mod player;
pub mod remote;
pub mod store;

#[cfg(test)]
mod tests {
    use crate::app::{App, CurrentScreen};
    use crate::identity::DeviceIdentity;

    #[test]
    fn test_app_new() {
        let app = App::new(DeviceIdentity::generate());
        assert_eq!(app.current_screen, CurrentScreen::Activation);
    }
}
