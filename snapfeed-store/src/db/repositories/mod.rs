pub mod comment_repository;
pub mod follow_repository;
pub mod like_repository;
pub mod post_repository;
pub mod user_repository;

pub use comment_repository::CommentRepository;
pub use follow_repository::FollowRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;
pub use user_repository::UserRepository;
