mod client;
mod scoreboard;
mod settings;
