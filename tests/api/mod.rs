mod auth_tests;
mod concurrency_tests;
mod health_tests;
mod membership_tests;
mod message_tests;
mod room_message_tests;
mod room_tests;
mod user_tests;
