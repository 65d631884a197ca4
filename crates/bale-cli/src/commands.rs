use anyhow::bail;
use colored::{ColoredString, Colorize};

use bale_api::{Atlas, Credentials, HttpAtlas, HttpLedger, Ledger, LedgerNodeRecord, PartRecord};
use bale_stage::{build_envelope, named_envelope, stage_file, stage_url};
use bale_store::{Filter, StagingEntry, StagingStore};
use bale_sync::{find_live_node, SyncEngine, SyncReport};
use bale_types::{valid_uuid, ArtifactId, ContentType, LifecycleState};

use crate::cli::*;
use crate::config::{global_config_path, GlobalConfig, LocalConfig};
use crate::workspace::Workspace;

/// Prefix that marks an argument as an alias reference, `id=<alias>`.
const ALIAS_TOKEN: &str = "id=";

/// Longest alias name `alias --set` accepts.
const ALIAS_MAX_LEN: usize = 15;

/// Name column width in the staging table; longer names are clipped.
const NAME_WIDTH: usize = 40;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(_) => cmd_init(),
        Command::Add(args) => cmd_add(args),
        Command::Envelope(args) => cmd_envelope(args),
        Command::Status(args) => cmd_status(args),
        Command::Push(_) => cmd_push(),
        Command::Remove(args) => cmd_remove(args),
        Command::Synch(_) => cmd_synch(),
        Command::Ping(args) => cmd_ping(args),
        Command::Alias(args) => cmd_alias(args),
        Command::Config(args) => cmd_config(args),
        Command::Network(args) => cmd_network(args),
        Command::Part(args) => cmd_part(args),
        Command::About(_) => cmd_about(),
    }
}

/// Everything a staging-area command needs: the discovered workspace,
/// an open store, and the parsed local config.
struct Session {
    workspace: Workspace,
    store: StagingStore,
    local: LocalConfig,
}

fn open_session() -> anyhow::Result<Session> {
    let workspace = Workspace::discover()?;
    let store = StagingStore::open(workspace.db_path())?;
    let local = LocalConfig::load(&workspace.local_config_path())?;
    Ok(Session {
        workspace,
        store,
        local,
    })
}

fn cmd_init() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (workspace, created) = Workspace::init(&cwd)?;
    if created {
        LocalConfig::default().save(&workspace.local_config_path())?;
        StagingStore::open(workspace.db_path())?;
        println!(
            "{} Initialized bale working directory in {}",
            "✓".green(),
            workspace.bale_dir().display().to_string().bold()
        );
    } else {
        println!(
            "{} already contains a bale working directory",
            workspace.root().display()
        );
    }

    let global_path = global_config_path()?;
    if !global_path.exists() {
        GlobalConfig::default().save(&global_path)?;
        println!("Created global configuration {}", global_path.display());
    }
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let session = open_session()?;

    if let Some(url) = &args.url {
        match stage_url(url, args.openchain) {
            Ok(record) => {
                session.store.put(&record)?;
                println!("  {} {}", "staging:".green(), record.record.name);
            }
            Err(err) => println!("  {} {err}", "error:".red()),
        }
        return Ok(());
    }
    if let Some(dir) = &args.dir {
        return add_directory(session, dir, args.openchain);
    }
    if args.paths.is_empty() {
        bail!("nothing to stage; pass one or more files, --dir, or --url");
    }
    // one bad path does not stop the rest
    for path in &args.paths {
        let staged = if ContentType::classify(path) == ContentType::Url {
            stage_url(path, args.openchain)
        } else {
            stage_file(path, args.openchain)
        };
        match staged {
            Ok(record) => {
                session.store.put(&record)?;
                println!("  {} {}", "staging:".green(), record.record.name);
            }
            Err(err) => println!("  {} {err}", "error:".red()),
        }
    }
    Ok(())
}

fn add_directory(mut session: Session, dir: &str, openchain: bool) -> anyhow::Result<()> {
    let bundle = build_envelope(dir, openchain)?;
    let name = bundle.envelope.record.name.clone();
    let uuid = bundle.envelope.record.uuid;
    session.store.put(&bundle.envelope)?;
    println!("  {} /{}", "creating:".green(), name);
    for member in &bundle.members {
        session.store.put(member)?;
        println!("  {} {}", "staging:".green(), member.envelope_path);
    }
    if bundle.oversized() {
        println!(
            "  {} {} files staged from one directory",
            "warning:".yellow(),
            bundle.file_count()
        );
    }
    session.local.envelope_uuid = uuid.to_string();
    session.local.save(&session.workspace.local_config_path())?;
    session.store.define_alias(&name, &uuid.to_string())?;
    println!("Default envelope set to {uuid}");
    println!("Use '{ALIAS_TOKEN}{name}' to refer to it in commands");
    Ok(())
}

fn cmd_envelope(args: EnvelopeArgs) -> anyhow::Result<()> {
    let mut session = open_session()?;

    if let Some(name) = &args.create {
        let staged = named_envelope(name, args.openchain);
        let uuid = staged.record.uuid;
        session.store.put(&staged)?;
        session.local.envelope_uuid = uuid.to_string();
        session.local.save(&session.workspace.local_config_path())?;
        println!("  {} /{}", "creating:".green(), name);
        println!("Default envelope set to {uuid}");
        session.store.define_alias(name, &uuid.to_string())?;
        println!("Use '{ALIAS_TOKEN}{name}' to refer to it in commands");
        return Ok(());
    }

    if let Some(token) = &args.set {
        let entry = find_entry(&session.store, token)?;
        if !entry.record().is_envelope() {
            bail!("'{}' is not an envelope", entry.record().name);
        }
        session.local.envelope_uuid = entry.record().uuid.to_string();
        session.local.save(&session.workspace.local_config_path())?;
        println!("Default envelope set to {}", entry.record().name.green());
        return Ok(());
    }

    let envelopes = session.store.artifacts(Filter::Envelopes)?;
    if envelopes.is_empty() {
        println!("No envelopes staged. Create one with 'bale envelope --create <name>'.");
        return Ok(());
    }
    let default = session.local.envelope();
    for entry in &envelopes {
        let marker = if default == Some(entry.record().uuid) { "*" } else { " " };
        println!(
            "{} {}  {}",
            marker,
            entry.record().uuid,
            entry.record().name.green()
        );
    }
    Ok(())
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let session = open_session()?;
    if args.view.is_empty() {
        print_staging_table(&session)
    } else {
        view_records(&session, &args.view)
    }
}

fn print_staging_table(session: &Session) -> anyhow::Result<()> {
    let entries = session.store.artifacts(Filter::All)?;

    println!();
    println!(" |----------------  {}  ----------------|", "Staging Area".bold());
    println!("   Network:  {}", display_value(&session.local.ledger_network));
    println!("   Part:     {}", display_ref(&session.store, &session.local.part_uuid)?);
    println!("   Envelope: {}", display_ref(&session.store, &session.local.envelope_uuid)?);
    println!();

    if entries.is_empty() {
        println!("  The staging area is empty. Stage a file with 'bale add <file>'.");
        return Ok(());
    }

    println!(
        "  {:>4}  {:<40}  {:<16}  {:<5}  {}",
        "Id", "Name", "Type", "OpeCh", "Path"
    );
    println!(
        "  {:>4}  {:<40}  {:<16}  {:<5}  {}",
        "----",
        "-".repeat(NAME_WIDTH),
        "-".repeat(16),
        "-----",
        "-".repeat(24)
    );
    for entry in &entries {
        let record = entry.record();
        // pad before coloring; escape codes would break the alignment
        let name = format!("{:<40}", clip_name(&record.name));
        let name = if entry.staged.on_ledger {
            name.green()
        } else {
            name.yellow()
        };
        let openchain = if record.openchain { " Y" } else { " -" };
        println!(
            "  {:>4}  {}  {:<16}  {:<5}  {}",
            entry.id,
            name,
            record.content_type.as_str(),
            openchain,
            path_column(entry)
        );
    }
    println!();
    println!(
        "  records in {} are on the ledger; {} ones have not been pushed",
        "green".green(),
        "yellow".yellow()
    );
    println!("  drop a record with 'bale remove <id>'");
    Ok(())
}

fn view_records(session: &Session, ids: &[String]) -> anyhow::Result<()> {
    for raw in ids {
        match find_entry(&session.store, raw) {
            Ok(entry) => print_record_card(&entry),
            Err(err) => println!("  {} {err}", "error:".red()),
        }
    }
    Ok(())
}

fn print_record_card(entry: &StagingEntry) {
    let record = entry.record();
    println!();
    println!("  {}", record.name.bold());
    println!("  {:<12} {}", "UUID:", record.uuid);
    println!("  {:<12} {}", "Alias:", record.alias);
    println!("  {:<12} {}", "Label:", record.label);
    println!("  {:<12} {}", "Type:", record.content_type);
    println!("  {:<12} {}", "Checksum:", record.checksum);
    println!("  {:<12} {}", "OpenChain:", if record.openchain { "Yes" } else { "No" });
    println!("  {:<12} {}", "Content:", entry.staged.content_path);
    println!("  {:<12} {}", "Path:", entry.staged.envelope_path);
    println!("  {:<12} {}", "State:", state_label(entry.state()));
    if let Some(parent) = entry.staged.envelope {
        println!("  {:<12} {}", "Envelope:", parent);
    }
}

fn cmd_push() -> anyhow::Result<()> {
    let mut session = open_session()?;

    let part_uuid = session.local.part_uuid.clone();
    if !valid_uuid(&part_uuid) {
        bail!("the default part is not set; run 'bale part --set <uuid>' first");
    }
    let envelope = match session.local.envelope() {
        Some(uuid) => uuid,
        None => bail!(
            "the default envelope is not set; run 'bale envelope --create <name>' or 'bale envelope --set <id>' first"
        ),
    };
    if session.local.public_key.is_empty() || session.local.private_key.is_empty() {
        bail!("signing keys are not set; configure public_key and private_key first");
    }
    if session.local.ledger_address.is_empty() {
        bail!("the ledger address is not set; run 'bale synch' first");
    }

    let mut ledger = HttpLedger::new(&session.local.ledger_address)?;
    if ledger.ping().is_err() {
        println!(
            "  {} ledger node {} is not answering",
            "warning:".yellow(),
            session.local.ledger_address.bold()
        );
        if !session.local.auto_synch {
            bail!(
                "the ledger node is unreachable and auto_synch is off; run 'bale synch' to pick a live node"
            );
        }
        let node = adopt_live_node(&mut session)?;
        ledger = HttpLedger::new(&node.api_url)?;
    }

    println!(
        "Pushing staged records to {}",
        session.local.ledger_address.bold()
    );
    let creds = Credentials::new(&session.local.public_key, &session.local.private_key);
    let report =
        SyncEngine::new(&session.store, &ledger, creds).push_envelope(envelope, &part_uuid)?;
    render_report(&report);
    if report.aborted {
        bail!("push aborted: the envelope could not be registered");
    }
    Ok(())
}

/// Ask the atlas directory for this network's nodes and adopt the
/// first one that answers a ping. The adopted address is persisted so
/// later commands go straight to it.
fn adopt_live_node(session: &mut Session) -> anyhow::Result<LedgerNodeRecord> {
    let global = GlobalConfig::load(&global_config_path()?)?;
    if global.atlas_address.is_empty() {
        bail!("the atlas address is not set; run 'bale config --global atlas_address <host:port>'");
    }
    if session.local.ledger_network.is_empty() {
        bail!("the ledger network is not set; run 'bale config --local ledger_network <name>'");
    }

    println!(
        "  asking {} for {} nodes...",
        global.atlas_address.bold(),
        session.local.ledger_network.bold()
    );
    let atlas = HttpAtlas::new(&global.atlas_address)?;
    let node = find_live_node(&atlas, &session.local.ledger_network, |address| {
        HttpLedger::new(address)
            .map(|ledger| ledger.ping().is_ok())
            .unwrap_or(false)
    })?;
    println!("  found {} at {}", node.name.green(), node.api_url.bold());

    session.local.ledger_address = node.api_url.clone();
    session.local.save(&session.workspace.local_config_path())?;
    println!("  ledger_address updated to {}", node.api_url);
    Ok(node)
}

fn render_report(report: &SyncReport) {
    for name in &report.pushed {
        println!("  {} {}", "pushed:".green(), name);
    }
    for failure in &report.failed {
        println!("  {} {}: {}", "failed:".red(), failure.name, failure.error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    if report.quiet() {
        println!("Nothing to push; every staged record is already on the ledger.");
        return;
    }
    if report.skipped > 0 {
        println!("  {} record(s) already on the ledger were skipped", report.skipped);
    }
    if report.clean() {
        println!("{} push complete", "✓".green());
    }
}

fn cmd_synch() -> anyhow::Result<()> {
    let mut session = open_session()?;
    if session.local.ledger_network.is_empty() {
        bail!("the ledger network is not set; run 'bale config --local ledger_network <name>'");
    }
    println!("Network: {}", session.local.ledger_network.bold());

    if !session.local.ledger_address.is_empty() {
        let live = HttpLedger::new(&session.local.ledger_address)
            .map(|ledger| ledger.ping().is_ok())
            .unwrap_or(false);
        if live {
            println!(
                "Ledger node {} is {}",
                session.local.ledger_address.bold(),
                "ACTIVE".green()
            );
            return Ok(());
        }
        println!(
            "Ledger node {} is {}",
            session.local.ledger_address.bold(),
            "NOT ACTIVE".red()
        );
    }
    adopt_live_node(&mut session)?;
    Ok(())
}

fn cmd_ping(args: PingArgs) -> anyhow::Result<()> {
    if args.atlas {
        let global = GlobalConfig::load(&global_config_path()?)?;
        if global.atlas_address.is_empty() {
            bail!("the atlas address is not set; run 'bale config --global atlas_address <host:port>'");
        }
        let live = HttpAtlas::new(&global.atlas_address)
            .map(|atlas| atlas.ping().is_ok())
            .unwrap_or(false);
        report_ping("atlas", &global.atlas_address, live);
        return Ok(());
    }

    let address = match &args.address {
        Some(address) => address.clone(),
        None => {
            let session = open_session()?;
            if session.local.ledger_address.is_empty() {
                bail!("the ledger address is not set; run 'bale synch' first");
            }
            session.local.ledger_address.clone()
        }
    };
    let live = HttpLedger::new(&address)
        .map(|ledger| ledger.ping().is_ok())
        .unwrap_or(false);
    report_ping("ledger node", &address, live);
    Ok(())
}

fn report_ping(what: &str, address: &str, live: bool) {
    if live {
        println!("{} {} {} is alive", "✓".green(), what, address.bold());
    } else {
        println!("{} {} {} did not answer", "✗".red(), what, address.bold());
    }
}

fn cmd_remove(args: RemoveArgs) -> anyhow::Result<()> {
    let session = open_session()?;
    if args.all {
        let n = session.store.remove_all()?;
        println!("Removed {n} record(s) from the staging area.");
        return Ok(());
    }
    if args.ids.is_empty() {
        bail!("nothing to remove; pass staging ids or --all");
    }
    for raw in &args.ids {
        match find_entry(&session.store, raw) {
            Ok(entry) => {
                session.store.remove(entry.id)?;
                println!("  {} {}: {}", "removed:".green(), entry.id, entry.record().name);
            }
            Err(err) => println!("  {} {err}", "error:".red()),
        }
    }
    Ok(())
}

fn cmd_alias(args: AliasArgs) -> anyhow::Result<()> {
    let session = open_session()?;

    if let Some(pair) = &args.set {
        // clap guarantees exactly two values
        let (alias, value) = (&pair[0], &pair[1]);
        if !valid_alias(alias) {
            bail!(
                "'{alias}' is not a usable alias: up to {ALIAS_MAX_LEN} characters, \
                 starting with a letter, digit, or '_', continuing with letters, \
                 digits, '.', '_', or '-'"
            );
        }
        session.store.define_alias(alias, value)?;
        println!("{} -> {}", alias.cyan(), value);
        return Ok(());
    }

    if let Some(alias) = &args.get {
        match session.store.resolve_alias(alias)? {
            Some(value) => println!("{value}"),
            None => bail!("alias '{alias}' is not defined"),
        }
        return Ok(());
    }

    let aliases = session.store.aliases()?;
    if aliases.is_empty() {
        println!("No aliases defined.");
        return Ok(());
    }
    for entry in &aliases {
        let name = format!("{:<15}", entry.alias);
        println!("  {} {}", name.cyan(), entry.value);
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    if let Some(kv) = &args.global {
        let path = global_config_path()?;
        let mut global = GlobalConfig::load(&path)?;
        let key = &kv[0];
        match kv.get(1) {
            Some(value) => {
                global.set(key, value)?;
                global.save(&path)?;
                println!("{} = {}", key.bold(), value);
            }
            None => println!("{}", global.get(key)?),
        }
        return Ok(());
    }

    if let Some(kv) = &args.local {
        let mut session = open_session()?;
        let key = &kv[0];
        match kv.get(1) {
            Some(value) => {
                // id= tokens work here too, so an alias can set envelope_uuid
                let value = resolve_id_token(&session.store, value)?;
                session.local.set(key, &value)?;
                session.local.save(&session.workspace.local_config_path())?;
                println!("{} = {}", key.bold(), value);
            }
            None => println!("{}", session.local.get(key)?),
        }
        return Ok(());
    }

    let session = open_session()?;
    println!("{}", "local".bold());
    for key in LocalConfig::KEYS {
        println!("  {:<16} {}", key, session.local.get(key)?);
    }
    let global = GlobalConfig::load(&global_config_path()?)?;
    println!("{}", "global".bold());
    for key in GlobalConfig::KEYS {
        println!("  {:<16} {}", key, global.get(key)?);
    }
    Ok(())
}

fn cmd_network(args: NetworkArgs) -> anyhow::Result<()> {
    if args.list {
        let global = GlobalConfig::load(&global_config_path()?)?;
        if global.atlas_address.is_empty() {
            bail!("the atlas address is not set; run 'bale config --global atlas_address <host:port>'");
        }
        let atlas = HttpAtlas::new(&global.atlas_address)?;
        let spaces = atlas.network_spaces()?;
        if spaces.is_empty() {
            println!("No network spaces registered.");
            return Ok(());
        }
        for space in &spaces {
            let name = format!("{:<24}", space.name);
            println!("  {} {:<10} {}", name.bold(), space.status, space.description);
        }
        return Ok(());
    }

    let session = open_session()?;
    if session.local.ledger_network.is_empty() {
        println!("The network has not been assigned.");
    } else {
        println!("{}", session.local.ledger_network);
    }
    Ok(())
}

fn cmd_part(args: PartArgs) -> anyhow::Result<()> {
    if let Some(uuid) = &args.set {
        let mut session = open_session()?;
        session.local.set("part_uuid", uuid)?;
        session.local.save(&session.workspace.local_config_path())?;
        println!("Default part set to {uuid}");
        return Ok(());
    }

    if args.get || args.uuid.is_some() {
        let session = open_session()?;
        let uuid = match &args.uuid {
            Some(uuid) => uuid.clone(),
            None => session.local.part_uuid.clone(),
        };
        if !valid_uuid(&uuid) {
            bail!("no part uuid given and the default part is not set");
        }
        if session.local.ledger_address.is_empty() {
            bail!("the ledger address is not set; run 'bale synch' first");
        }
        let ledger = HttpLedger::new(&session.local.ledger_address)?;
        let part = ledger.fetch_part(&uuid)?;
        print_part_card(&part);
        return Ok(());
    }

    let session = open_session()?;
    if session.local.part_uuid.is_empty() {
        println!("The default part has not been assigned.");
    } else {
        println!("{}", session.local.part_uuid);
    }
    Ok(())
}

fn print_part_card(part: &PartRecord) {
    println!();
    println!("  {}", part.name.bold());
    println!("  {:<12} {}", "UUID:", part.uuid);
    println!("  {:<12} {}", "Version:", part.version);
    println!("  {:<12} {}", "Label:", part.label);
    println!("  {:<12} {}", "Alias:", part.alias);
    println!("  {:<12} {}", "Licensing:", part.licensing);
    println!("  {:<12} {}", "Checksum:", part.checksum);
    if !part.src_uri.is_empty() {
        println!("  {:<12} {}", "Url:", part.src_uri);
    }
    if !part.status.is_empty() {
        println!("  {:<12} {}", "Status:", part.status);
    }
    if !part.description.is_empty() {
        println!("  {:<12} {}", "About:", part.description);
    }
}

fn cmd_about() -> anyhow::Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME").bold(), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!("{}", env!("CARGO_PKG_REPOSITORY").blue());
    Ok(())
}

/// Rewrite `id=<alias>` arguments to their stored values before clap
/// parses the command line, so every UUID-valued argument takes an
/// alias. Commands without such an argument never touch the workspace.
pub fn expand_alias_args(args: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !args.iter().skip(1).any(|arg| arg.starts_with(ALIAS_TOKEN)) {
        return Ok(args);
    }
    let session = open_session()?;
    substitute_aliases(&session.store, args)
}

fn substitute_aliases(store: &StagingStore, mut args: Vec<String>) -> anyhow::Result<Vec<String>> {
    for arg in args.iter_mut().skip(1) {
        if arg.starts_with(ALIAS_TOKEN) {
            *arg = resolve_id_token(store, arg)?;
        }
    }
    Ok(args)
}

/// Expand an `id=<alias>` token through the alias table; anything else
/// passes through untouched.
fn resolve_id_token(store: &StagingStore, value: &str) -> anyhow::Result<String> {
    match value.strip_prefix(ALIAS_TOKEN) {
        None => Ok(value.to_string()),
        Some(alias) => match store.resolve_alias(alias)? {
            Some(resolved) => Ok(resolved),
            None => bail!("alias '{alias}' is not defined"),
        },
    }
}

/// Look a record up by staging id, record UUID, or `id=` alias token.
fn find_entry(store: &StagingStore, raw: &str) -> anyhow::Result<StagingEntry> {
    let token = resolve_id_token(store, raw)?;
    if let Ok(id) = token.parse::<i64>() {
        return Ok(store.get(id)?);
    }
    match ArtifactId::parse(&token) {
        Ok(uuid) => Ok(store.get_by_uuid(uuid)?),
        Err(_) => bail!("'{raw}' is neither a staging id nor a record uuid"),
    }
}

/// Alias names: short, leading alphanumeric or underscore, then
/// alphanumerics plus `.`, `_`, `-`.
fn valid_alias(name: &str) -> bool {
    if name.is_empty() || name.len() > ALIAS_MAX_LEN {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Names longer than the column keep their leading characters.
fn clip_name(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH {
        name.chars().take(NAME_WIDTH - 1).collect()
    } else {
        name.to_string()
    }
}

/// URL records show where the content lives; everything else shows its
/// place inside the envelope.
fn path_column(entry: &StagingEntry) -> &str {
    if entry.record().content_type == ContentType::Url {
        &entry.staged.content_path
    } else {
        &entry.staged.envelope_path
    }
}

fn display_value(value: &str) -> ColoredString {
    if value.is_empty() {
        "(not set)".red()
    } else {
        value.green()
    }
}

/// Render a configured UUID with its alias when one is defined.
fn display_ref(store: &StagingStore, uuid: &str) -> anyhow::Result<ColoredString> {
    if uuid.is_empty() {
        return Ok("(not set)".red());
    }
    Ok(match store.alias_for(uuid)? {
        Some(alias) => format!("{uuid} ({alias})").green(),
        None => uuid.to_string().green(),
    })
}

fn state_label(state: LifecycleState) -> ColoredString {
    match state {
        LifecycleState::Staged => state.as_str().yellow(),
        LifecycleState::Assigned => state.as_str().cyan(),
        LifecycleState::Confirmed => state.as_str().green(),
    }
}
