use envfill::FromEnv;

#[derive(FromEnv)]
pub enum Settings {
    Local,
    Remote,
}

fn main() {}
