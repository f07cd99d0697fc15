mod health_tests;
mod support;
