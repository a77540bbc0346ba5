/// SQL schema for the Yeet database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    password_hash TEXT,
    bio TEXT,
    date_joined TEXT NOT NULL,
    last_login TEXT,
    google_id TEXT UNIQUE
);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    post_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    content TEXT NOT NULL CHECK(length(content) BETWEEN 1 AND 280),
    latitude REAL CHECK(latitude IS NULL OR latitude BETWEEN -90 AND 90),
    longitude REAL CHECK(longitude IS NULL OR longitude BETWEEN -180 AND 180),
    location_name TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC);

-- Follows table (user_id follows following_user_id)
CREATE TABLE IF NOT EXISTS follows (
    user_id INTEGER NOT NULL,
    following_user_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, following_user_id),
    CHECK (user_id <> following_user_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (following_user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_user_id);

-- Likes table
CREATE TABLE IF NOT EXISTS likes (
    user_id INTEGER NOT NULL,
    post_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(post_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_post_id ON likes(post_id);

-- Retweets (re-yeets) table
CREATE TABLE IF NOT EXISTS retweets (
    user_id INTEGER NOT NULL,
    post_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(post_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_retweets_post_id ON retweets(post_id);

-- Predefined feedback reasons
CREATE TABLE IF NOT EXISTS feedback_options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT UNIQUE NOT NULL,
    is_positive INTEGER NOT NULL
);

-- Feedback surveys (user is optional)
CREATE TABLE IF NOT EXISTS feedback_surveys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER,
    likes_app INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
);

-- Survey-option junction table
CREATE TABLE IF NOT EXISTS feedback_survey_options (
    survey_id INTEGER NOT NULL,
    option_id INTEGER NOT NULL,
    PRIMARY KEY (survey_id, option_id),
    FOREIGN KEY (survey_id) REFERENCES feedback_surveys(id) ON DELETE CASCADE,
    FOREIGN KEY (option_id) REFERENCES feedback_options(id) ON DELETE CASCADE
);

-- Topics table
CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    location TEXT,
    created_at TEXT NOT NULL
);
"#;

/// Predefined feedback reasons, loaded on every start
pub const FEEDBACK_OPTIONS: &str = r#"
INSERT OR IGNORE INTO feedback_options (text, is_positive) VALUES
    ('Great user interface', 1),
    ('Easy to use', 1),
    ('Fast performance', 1),
    ('Good content', 1),
    ('Helpful features', 1),
    ('Confusing interface', 0),
    ('Slow performance', 0),
    ('Poor content quality', 0),
    ('Missing features', 0),
    ('Too many bugs', 0);
"#;

/// Demo data for development and testing:
/// - 4 users (alice, bob, charlie, diana) with no passwords
/// - a handful of posts, one with a location
/// - follows, likes and re-yeets between them
///
/// Timestamps use the same format rusqlite writes for `DateTime<Utc>` so the
/// seeded rows sort alongside posts created at runtime.
pub const TEST_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, username, email, first_name, last_name, bio, date_joined) VALUES
    (1, 'alice', 'alice@example.com', 'Alice', 'Anders', 'Rust enthusiast and terminal lover', '2024-01-01 00:00:00+00:00'),
    (2, 'bob', 'bob@example.com', 'Bob', 'Baker', 'Map nerd', '2024-01-02 00:00:00+00:00'),
    (3, 'charlie', 'charlie@example.com', 'Charlie', 'Chen', NULL, '2024-01-03 00:00:00+00:00'),
    (4, 'diana', 'diana@example.com', 'Diana', 'Diaz', 'Coffee first', '2024-01-04 00:00:00+00:00');

INSERT OR IGNORE INTO posts (post_id, user_id, content, latitude, longitude, location_name, created_at) VALUES
    (1, 1, 'First yeet!', NULL, NULL, NULL, '2024-02-01 09:00:00+00:00'),
    (2, 2, 'Greetings from the river walk', 29.4241, -98.4936, 'San Antonio, Texas', '2024-02-01 10:30:00+00:00'),
    (3, 3, 'Anyone else up this early?', NULL, NULL, NULL, '2024-02-02 05:45:00+00:00'),
    (4, 2, 'Second yeet, still no edit button', NULL, NULL, NULL, '2024-02-03 18:15:00+00:00'),
    (5, 4, 'Coffee count: 3', NULL, NULL, NULL, '2024-02-04 08:00:00+00:00');

INSERT OR IGNORE INTO follows (user_id, following_user_id, created_at) VALUES
    (1, 2, '2024-02-01 11:00:00+00:00'),
    (1, 3, '2024-02-01 11:05:00+00:00'),
    (2, 1, '2024-02-01 12:00:00+00:00'),
    (4, 1, '2024-02-04 09:00:00+00:00');

INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES
    (1, 2, '2024-02-01 11:10:00+00:00'),
    (3, 2, '2024-02-02 06:00:00+00:00'),
    (2, 1, '2024-02-01 12:05:00+00:00');

INSERT OR IGNORE INTO retweets (user_id, post_id, created_at) VALUES
    (1, 4, '2024-02-03 19:00:00+00:00');
"#;
