// generates man page from clap CLI definition
// outputs to man/rulekit.1

use clap::CommandFactory;
use clap_mangen::Man;
use rulekit::cli::Cli;

fn main() -> std::io::Result<()> {
    let cmd = Cli::command();
    let man = Man::new(cmd);

    std::fs::create_dir_all("man")?;

    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    std::fs::write("man/rulekit.1", buffer)?;

    println!("Generated man/rulekit.1");
    Ok(())
}
