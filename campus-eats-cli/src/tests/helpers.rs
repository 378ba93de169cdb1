//! Test helpers for writing review databases to temporary directories.

use camino::Utf8PathBuf;
use campus_eats_core::{Location, PriceTier, Rating, Review, UserId, test_support};
use tempfile::TempDir;

/// A review database in a temporary directory.
pub(super) struct CampusDatabase {
    _dir: TempDir,
    root: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl CampusDatabase {
    /// Write the standard campus dataset.
    ///
    /// Location 1 has three five star reviews, location 2 a five from `sara`
    /// and a four from `omar`, location 3 four two star reviews, and location
    /// 4 none. `omar` is the only reviewer of both 1 and 2. Locations 2 and 4
    /// are cafes sharing the `tea` tag.
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("campuseats.db");
        let locations = [
            Location::new(1, "Ayan Gardens", "Restaurant").with_tags_csv("biryani, bbq"),
            Location::new(2, "Raju Campus Hotel", "Cafe")
                .with_tags_csv("tea, breakfast")
                .with_price_tier(PriceTier::new(1).expect("tier")),
            Location::new(3, "Hot N Spicy", "Fast Food").with_tags_csv("zinger, fries"),
            Location::new(4, "Asrar Bucks", "Cafe").with_tags_csv("coffee, tea"),
        ];
        let ratings: [(u64, &str, u8); 9] = [
            (1, "omar", 5),
            (1, "bilal", 5),
            (1, "hina", 5),
            (2, "sara", 5),
            (2, "omar", 4),
            (3, "zainab", 2),
            (3, "ayesha", 2),
            (3, "usman", 2),
            (3, "fatima", 2),
        ];
        let reviews: Vec<Review> = ratings
            .into_iter()
            .zip(1_u64..)
            .map(|((location_id, user, stars), id)| {
                let rating = Rating::new(stars).expect("rating");
                Review::new(id, location_id, UserId::new(user), rating, 1_700_000_000)
            })
            .collect();
        test_support::write_sqlite_database(path.as_std_path(), &locations, &reviews)
            .expect("write campus database");
        Self {
            _dir: dir,
            root,
            path,
        }
    }

    pub(super) fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    pub(super) fn root(&self) -> &Utf8PathBuf {
        &self.root
    }
}
