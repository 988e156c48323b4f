
mod drive;
mod parse_good;
mod roundtrip;
mod spans;
mod stack_safety;
