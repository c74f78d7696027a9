mod health_test;
mod server_history_test;
mod servers_test;
mod views_test;
