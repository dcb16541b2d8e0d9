use envfill::FromEnv;

#[derive(FromEnv)]
pub struct Wrapper<T> {
    pub value: T,
}

fn main() {}
