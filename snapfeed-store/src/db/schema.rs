/// SQL schema for the Snapfeed database
///
/// Foreign keys restrict deletes of referenced rows. CHECK constraints named
/// `*_required` reject empty strings for required text columns; the error
/// mapping reports those as missing fields.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    is_active INTEGER NOT NULL,
    username TEXT NOT NULL UNIQUE,
    full_name TEXT,
    bio TEXT NOT NULL DEFAULT '',
    profile_image TEXT,
    created_at TEXT,
    CONSTRAINT users_email_required CHECK (length(email) > 0),
    CONSTRAINT users_username_required CHECK (length(username) > 0),
    CONSTRAINT users_password_required CHECK (length(password) > 0),
    CONSTRAINT users_email_length CHECK (length(email) <= 120),
    CONSTRAINT users_username_length CHECK (length(username) <= 80),
    CONSTRAINT users_password_length CHECK (length(password) <= 128),
    CONSTRAINT users_full_name_length CHECK (full_name IS NULL OR length(full_name) <= 120),
    CONSTRAINT users_profile_image_length CHECK (profile_image IS NULL OR length(profile_image) <= 250),
    CONSTRAINT users_is_active_bool CHECK (is_active IN (0, 1))
);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    image_url TEXT NOT NULL,
    caption TEXT,
    location TEXT,
    created_at TEXT,
    CONSTRAINT posts_image_url_required CHECK (length(image_url) > 0),
    CONSTRAINT posts_image_url_length CHECK (length(image_url) <= 250),
    CONSTRAINT posts_location_length CHECK (location IS NULL OR length(location) <= 120),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT,
    CONSTRAINT comments_content_required CHECK (length(content) > 0),
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE RESTRICT,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
CREATE INDEX IF NOT EXISTS idx_comments_user_id ON comments(user_id);

-- Likes table (one like per user per post)
CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    post_id INTEGER NOT NULL,
    created_at TEXT,
    UNIQUE (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_likes_user_id ON likes(user_id);
CREATE INDEX IF NOT EXISTS idx_likes_post_id ON likes(post_id);

-- Follows table (one-way relationships, no self-follows)
CREATE TABLE IF NOT EXISTS follows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    follower_id INTEGER NOT NULL,
    followed_id INTEGER NOT NULL,
    created_at TEXT,
    UNIQUE (follower_id, followed_id),
    CONSTRAINT follows_no_self_follow CHECK (follower_id <> followed_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE RESTRICT,
    FOREIGN KEY (followed_id) REFERENCES users(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_follows_follower ON follows(follower_id);
CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(followed_id);
"#;

/// Tables in dependency order: every table only references tables before it.
pub const TABLES: [&str; 5] = ["users", "posts", "comments", "likes", "follows"];

/// Indexes created by [`SCHEMA`], checked by `inspect-db`.
pub const INDEXES: [&str; 7] = [
    "idx_posts_user_id",
    "idx_comments_post_id",
    "idx_comments_user_id",
    "idx_likes_user_id",
    "idx_likes_post_id",
    "idx_follows_follower",
    "idx_follows_followed",
];

/// Demo data for local development:
/// - 3 users (alice, bob, charlie), one of them inactive
/// - posts with and without captions/locations
/// - comments, likes and a small follow graph
pub const DEMO_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, email, password, is_active, username, full_name, bio, profile_image, created_at) VALUES
    (1, 'alice@snapfeed.dev', 'demo-credential-alice', 1, 'alice', 'Alice Liddell', 'Film photography and rooftops', 'https://img.snapfeed.dev/u/alice.png', '2024-01-01T09:00:00.000000Z'),
    (2, 'bob@snapfeed.dev', 'demo-credential-bob', 1, 'bob', 'Bob Marley', '', NULL, '2024-01-02T10:30:00.000000Z'),
    (3, 'charlie@snapfeed.dev', 'demo-credential-charlie', 0, 'charlie', NULL, 'Account pending verification', NULL, '2024-01-03T08:15:00.000000Z');

INSERT OR IGNORE INTO posts (id, user_id, image_url, caption, location, created_at) VALUES
    (1, 1, 'https://img.snapfeed.dev/p/1.jpg', 'Golden hour over the river', 'Lisbon', '2024-01-05T18:02:00.000000Z'),
    (2, 1, 'https://img.snapfeed.dev/p/2.jpg', NULL, NULL, '2024-01-06T07:45:00.000000Z'),
    (3, 2, 'https://img.snapfeed.dev/p/3.jpg', 'First roll developed', 'Porto', '2024-01-07T12:00:00.000000Z');

INSERT OR IGNORE INTO comments (id, post_id, user_id, content, created_at) VALUES
    (1, 1, 2, 'Those colours!', '2024-01-05T19:00:00.000000Z'),
    (2, 1, 3, 'Which lens was this?', '2024-01-05T20:10:00.000000Z'),
    (3, 3, 1, 'Welcome to analog', '2024-01-07T12:30:00.000000Z');

INSERT OR IGNORE INTO likes (id, user_id, post_id, created_at) VALUES
    (1, 2, 1, '2024-01-05T18:30:00.000000Z'),
    (2, 3, 1, '2024-01-05T20:00:00.000000Z'),
    (3, 1, 3, '2024-01-07T12:20:00.000000Z');

INSERT OR IGNORE INTO follows (id, follower_id, followed_id, created_at) VALUES
    (1, 2, 1, '2024-01-02T11:00:00.000000Z'),
    (2, 3, 1, '2024-01-03T09:00:00.000000Z'),
    (3, 1, 2, '2024-01-04T10:00:00.000000Z');
"#;
