pub mod answer;
pub mod question;
pub mod quiz_result;
pub mod quiz_state;
