use envfill::FromEnv;

#[derive(FromEnv)]
pub struct Port(pub u16);

fn main() {}
