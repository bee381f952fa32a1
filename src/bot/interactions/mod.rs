pub mod history_buttons;
pub mod review_buttons;
