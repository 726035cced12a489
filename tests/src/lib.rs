#![cfg(test)]

mod discovery;
mod stubs;
