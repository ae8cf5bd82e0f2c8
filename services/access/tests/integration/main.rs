mod profile_test;
mod router_test;
mod sign_in_test;
