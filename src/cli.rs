//! Command-line surface: one subcommand per user-facing flow of the app.

use crate::config::ConfigArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lost-and-found pet service client")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session on this device
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create a new account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        city: String,
    },

    /// Forget the session and wipe the local mirror
    Logout,

    /// List pets, mirror-first; refreshes from the server when the mirror
    /// is empty, and pulls missing first photos into the cache
    Home,

    /// Force a full re-fetch of the pet list from the server
    Refresh,

    /// Pet record operations
    Pet {
        #[command(subcommand)]
        command: PetCommand,
    },

    /// Photo operations
    Photo {
        #[command(subcommand)]
        command: PhotoCommand,
    },

    /// Report a found lost pet and search registered pets for its owner
    FindLost {
        /// Photo of the found pet
        #[arg(long)]
        photo: PathBuf,
        /// Where the pet was found
        #[arg(long)]
        latitude: f64,
        #[arg(long)]
        longitude: f64,
    },

    /// AI-drafted lost-pet ads
    Ad {
        #[command(subcommand)]
        command: AdCommand,
    },

    /// View or edit the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Choose the profile avatar (stored per user)
    Avatar {
        #[command(subcommand)]
        command: AvatarCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PetCommand {
    /// Register a new pet, optionally uploading photos right away
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: i64,
        #[arg(long)]
        breed: String,
        #[arg(long, default_value = "Dog")]
        species: String,
        #[arg(long, default_value = "Male")]
        gender: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        city: String,
        /// Photo file to upload after creation (repeatable)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },

    /// Show one pet, materializing all of its photos
    Show { pet_id: String },

    /// Edit fields of a pet (unspecified fields keep their value)
    Edit {
        pet_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<i64>,
        #[arg(long)]
        breed: Option<String>,
        #[arg(long)]
        species: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },

    /// Flip the lost flag (lost <-> not lost)
    ToggleLost { pet_id: String },

    /// Delete a pet from the server and the local mirror
    Delete { pet_id: String },

    /// Ranked breed predictions for a pet's photo
    Roots { pet_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Upload photos for a pet and cache them locally
    Add {
        pet_id: String,
        /// Image files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete a photo from the server and drop it from the mirror
    Rm { pet_id: String, photo_id: String },
}

#[derive(Subcommand, Debug)]
pub enum AdCommand {
    /// Generate fresh ad text from the pet's first photo
    Generate { pet_id: String },

    /// Print the last ad generated for a pet
    Last { pet_id: String },

    /// Save edited ad text back to the server
    Save {
        pet_id: String,
        #[arg(long)]
        text: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the profile stored on the server
    Show,

    /// Update profile fields (unspecified fields keep their value)
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },

    /// Change the account password
    Password {
        #[arg(long)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AvatarCommand {
    /// Print the avatar chosen for the signed-in user
    Show,

    /// Choose an avatar by id (1-6)
    Set { id: String },
}
