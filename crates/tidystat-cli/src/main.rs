mod command;
mod figure;
mod util;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
