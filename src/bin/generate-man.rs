// generates man page from clap CLI definition
// outputs to man/editcond.1

use clap::CommandFactory;
use clap_mangen::Man;
use editcond::cli::Cli;

fn main() -> std::io::Result<()> {
    let man = Man::new(Cli::command());

    std::fs::create_dir_all("man")?;

    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    std::fs::write("man/editcond.1", buffer)?;

    println!("Generated man/editcond.1");
    Ok(())
}
