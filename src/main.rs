use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use handdown::api::{
    BasicInfo, HttpMarketplace, ImageUpload, ListingEdit, ListingType, MarketplaceApi, NewListing,
    TransactionType,
};
use handdown::commands;
use handdown::core::config::{self, CliOverrides};
use handdown::core::identity::{self, Identity};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "handdown", about = "Campus marketplace in your terminal")]
struct Args {
    /// Act as this user id (overrides HANDDOWN_USER_ID and the stored login)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Backend base URL (overrides HANDDOWN_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the user id
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored user id
    Logout,
    /// Create a listing
    Post {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum, default_value_t = ListingType::Listing)]
        listing_type: ListingType,
        #[arg(long, value_enum, default_value_t = TransactionType::Sell)]
        transaction_type: TransactionType,
        #[arg(long)]
        price: Option<f64>,
        /// Repeat for several tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Show your profile and your listings with their ids
    Profile,
    /// Change the title, description or price of one of your listings
    #[command(group(clap::ArgGroup::new("change").required(true).multiple(true)))]
    Edit {
        listing_id: String,
        #[arg(long, group = "change")]
        title: Option<String>,
        #[arg(long, group = "change")]
        description: Option<String>,
        #[arg(long, group = "change")]
        price: Option<f64>,
    },
    /// Delete one of your listings and its conversations
    Delete { listing_id: String },
    /// Create an account; a verification code is emailed to you
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Enter the emailed verification code and sign in
    Verify { code: String },
    /// Set your name and student id
    Info {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        student_id: String,
    },
    /// Set what you can offer other students
    Offerings {
        /// Repeat for several tags
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
    },
    /// Upload a profile photo
    Photo { path: PathBuf },
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn read_image(path: &Path) -> io::Result<ImageUpload> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(ImageUpload {
        file_name,
        mime: mime_for(path).to_string(),
        bytes,
    })
}

fn not_signed_in() -> io::Error {
    io::Error::other("no user id: run `handdown login`, pass --user or set HANDDOWN_USER_ID")
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to handdown.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("handdown.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
    log::info!("Handdown starting up");

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable config: {}", e);
        eprintln!("warning: {e}; using defaults");
        Default::default()
    });
    let stored_user = match identity::load_identity() {
        Ok(identity) => identity.map(|i| i.user_id),
        Err(e) => {
            log::warn!("Ignoring unreadable identity file: {}", e);
            None
        }
    };
    let cli = CliOverrides {
        base_url: args.base_url,
        user_id: args.user,
    };
    let resolved = config::resolve(&file_config, &cli, stored_user);
    log::info!("Using backend {}", resolved.base_url);

    let api = HttpMarketplace::new(&resolved.base_url).map_err(io::Error::other)?;

    match args.command {
        Some(Command::Login { email, password }) => {
            let user_id = api.login(&email, &password).await.map_err(|e| {
                log::warn!("Login failed for {}: {}", email, e);
                io::Error::other(format!("login failed: {e}"))
            })?;
            identity::save_identity(&Identity::new(user_id.clone()))?;
            println!("Signed in as {user_id}");
            Ok(())
        }
        Some(Command::Logout) => {
            if identity::clear_identity()? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
            Ok(())
        }
        Some(Command::Post {
            title,
            description,
            listing_type,
            transaction_type,
            price,
            tags,
            image,
        }) => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            let image = image.as_deref().map(read_image).transpose()?;
            let listing = NewListing {
                title,
                long_description: description,
                listing_type,
                transaction_type,
                price,
                tags,
                image,
            };
            api.create_listing(&user_id, listing)
                .await
                .map_err(|e| io::Error::other(format!("could not create listing: {e}")))?;
            println!("Listing created");
            Ok(())
        }
        Some(Command::Profile) => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            let content = commands::own_profile(&api, &user_id)
                .await
                .map_err(|e| io::Error::other(format!("could not load your profile: {e}")))?;
            print!("{}", commands::profile_report(&content));
            Ok(())
        }
        Some(Command::Edit {
            listing_id,
            title,
            description,
            price,
        }) => {
            let edits: Vec<ListingEdit> = [
                title.map(ListingEdit::Title),
                description.map(ListingEdit::Description),
                price.map(ListingEdit::Price),
            ]
            .into_iter()
            .flatten()
            .collect();
            commands::edit_listing(&api, &listing_id, &edits)
                .await
                .map_err(|e| io::Error::other(format!("could not edit listing: {e}")))?;
            println!("Listing {listing_id} updated");
            Ok(())
        }
        Some(Command::Delete { listing_id }) => {
            commands::delete_listing(&api, &listing_id)
                .await
                .map_err(|e| io::Error::other(format!("could not delete listing: {e}")))?;
            println!("Listing {listing_id} deleted");
            Ok(())
        }
        Some(Command::Signup { email, password }) => {
            api.request_signup(&email, &password)
                .await
                .map_err(|e| io::Error::other(format!("signup failed: {e}")))?;
            println!("Check {email} for a code, then run `handdown verify <code>`");
            Ok(())
        }
        Some(Command::Verify { code }) => {
            let user_id = api
                .verify_email(&code)
                .await
                .map_err(|e| io::Error::other(format!("verification failed: {e}")))?;
            identity::save_identity(&Identity::new(user_id.clone()))?;
            println!("Verified and signed in as {user_id}");
            Ok(())
        }
        Some(Command::Info {
            first_name,
            last_name,
            student_id,
        }) => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            let info = BasicInfo {
                fname: first_name,
                lname: last_name,
                student_id,
            };
            api.set_basic_info(&user_id, &info)
                .await
                .map_err(|e| io::Error::other(format!("could not save your details: {e}")))?;
            println!("Details saved");
            Ok(())
        }
        Some(Command::Offerings { tags }) => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            api.set_offerings(&user_id, &tags)
                .await
                .map_err(|e| io::Error::other(format!("could not save offerings: {e}")))?;
            println!("Offerings saved");
            Ok(())
        }
        Some(Command::Photo { path }) => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            let image = read_image(&path)?;
            api.upload_profile_photo(&user_id, image)
                .await
                .map_err(|e| io::Error::other(format!("could not upload photo: {e}")))?;
            println!("Profile photo uploaded");
            Ok(())
        }
        None => {
            let user_id = resolved.user_id.ok_or_else(not_signed_in)?;
            let api: Arc<dyn MarketplaceApi> = Arc::new(api);
            handdown::tui::run(api, user_id, resolved.poll_interval)
        }
    }
}
