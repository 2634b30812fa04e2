//! The yatta-client executable supports the following command line arguments:
//!
//! `yatta-client add <USER> <DESCRIPTION> [--addr IP-PORT]`
//!
//!     Add a task to a user's task list, creating the list if needed. Prints the new task.
//!
//! `yatta-client tasks <USER> [--addr IP-PORT]`
//!
//!     Print every task of a user, one per line.
//!
//! `yatta-client task <ID> [--addr IP-PORT]`
//!
//!     Print a single task.
//!
//! `yatta-client register <EMAIL> <PASSWORD> [--addr IP-PORT]`
//!
//!     Register an account. Fails if the email address is already in use.
//!
//! `yatta-client user <ID> [--addr IP-PORT]` and `yatta-client users [--addr IP-PORT]`
//!
//!     Print one or every account.
//!
//! `yatta-client login <EMAIL> <PASSWORD> [--addr IP-PORT]`
//!
//!     Check an email and password. Exits non-zero if they do not match.
//!
//! --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//! If --addr is not specified then connect on 127.0.0.1:8000.
//! Print an error and return a non-zero exit code on server error, or if IP-PORT does not
//! parse as an address. Missing tasks and users print "not found" but are not errors.

use std::net::SocketAddr;
use std::process::exit;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use yatta::config::{parse_addr, DEFAULT_ADDRESS};
use yatta::{Account, Request, Result, Task, YattaClient, YattaError};

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    req: Request,
}

fn main() {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let matches = App::new("yatta-client")
        .version(crate_version!())
        .about("a multi-user task list client")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(
            vec![
                SubCommand::with_name("add")
                    .about("Add a task to a user's task list")
                    .arg(Arg::with_name("USER").required(true).index(1))
                    .arg(Arg::with_name("DESCRIPTION").required(true).index(2)),
                SubCommand::with_name("tasks")
                    .about("Get every task of a user")
                    .arg(Arg::with_name("USER").required(true).index(1)),
                SubCommand::with_name("task")
                    .about("Get a task by id")
                    .arg(Arg::with_name("ID").required(true).index(1)),
                SubCommand::with_name("register")
                    .about("Register a new account")
                    .arg(Arg::with_name("EMAIL").required(true).index(1))
                    .arg(Arg::with_name("PASSWORD").required(true).index(2)),
                SubCommand::with_name("user")
                    .about("Get an account by id")
                    .arg(Arg::with_name("ID").required(true).index(1)),
                SubCommand::with_name("users").about("Get every account"),
                SubCommand::with_name("login")
                    .about("Check an email and password")
                    .arg(Arg::with_name("EMAIL").required(true).index(1))
                    .arg(Arg::with_name("PASSWORD").required(true).index(2)),
            ]
            .into_iter()
            .map(|cmd| cmd.arg(addr_arg())),
        )
        .get_matches();

    if let Err(e) = parse_options(&matches).and_then(run) {
        eprintln!("{}", e);
        exit(1);
    }
}

/// runs the specified request on a [`YattaClient`] connected to `opt.addr`
fn run(opt: Opt) -> Result<()> {
    let mut client = YattaClient::connect(opt.addr)?;
    match opt.req {
        Request::GetTasks { user } => match client.get_tasks(&user)? {
            Some(tasks) => tasks.iter().for_each(print_task),
            None => println!("not found"),
        },
        Request::GetTask { id } => match client.get_task(id)? {
            Some(task) => print_task(&task),
            None => println!("not found"),
        },
        Request::AddTask { user, description } => print_task(&client.add_task(&user, &description)?),
        Request::AddUser { email, password } => print_account(&client.register(&email, &password)?),
        Request::GetUser { id } => match client.get_user(id)? {
            Some(account) => print_account(&account),
            None => println!("not found"),
        },
        Request::GetUsers => client.get_users()?.iter().for_each(print_account),
        Request::Authenticate { email, password } => match client.authenticate(&email, &password)? {
            Some(account) => print_account(&account),
            None => return Err(YattaError::StringErr("email or password is incorrect".to_string())),
        },
    }
    Ok(())
}

fn print_task(task: &Task) {
    println!("{}\t{}", task.id, task.description);
}

fn print_account(account: &Account) {
    println!("{}\t{}", account.id, account.email);
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let (name, args) = matches.subcommand();
    let addr = args
        .and_then(|args| args.value_of("addr"))
        .unwrap_or(DEFAULT_ADDRESS);
    let addr = parse_addr(addr)?;

    let req = match (name, args) {
        ("add", Some(args)) => Request::AddTask {
            user: required(args, "USER")?,
            description: required(args, "DESCRIPTION")?,
        },
        ("tasks", Some(args)) => Request::GetTasks {
            user: required(args, "USER")?,
        },
        ("task", Some(args)) => Request::GetTask {
            id: parse_id(args)?,
        },
        ("register", Some(args)) => Request::AddUser {
            email: required(args, "EMAIL")?,
            password: required(args, "PASSWORD")?,
        },
        ("user", Some(args)) => Request::GetUser {
            id: parse_id(args)?,
        },
        ("users", Some(_)) => Request::GetUsers,
        ("login", Some(args)) => Request::Authenticate {
            email: required(args, "EMAIL")?,
            password: required(args, "PASSWORD")?,
        },
        (other, _) => return Err(YattaError::Parsing(format!("unknown command {:?}", other))),
    };

    Ok(Opt { addr, req })
}

/// the `--addr` option, shared by every subcommand
fn addr_arg() -> Arg<'static, 'static> {
    Arg::with_name("addr")
        .long("addr")
        .value_name("IP_ADDR:PORT")
        .help("sets the IP_ADDR:PORT of the server to connect to")
        .default_value(DEFAULT_ADDRESS)
}

fn required(args: &ArgMatches, name: &str) -> Result<String> {
    args.value_of(name)
        .map(String::from)
        .ok_or_else(|| YattaError::Parsing(format!("missing {}", name)))
}

fn parse_id(args: &ArgMatches) -> Result<u64> {
    let id = required(args, "ID")?;
    id.parse()
        .map_err(|_| YattaError::Parsing(format!("could not parse {} into an id", id)))
}

/// configures a tracing subscriber that will log warnings to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
