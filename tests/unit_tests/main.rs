mod infrastructure;
mod presentation;
