mod acquire;
mod converter;
mod wav_device;
